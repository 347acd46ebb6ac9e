//! Wire messages of the `vortex.api.v1` services.
//!
//! These mirror the generated protobuf stubs field for field: enumerations
//! travel as raw `i32`, optional scalars as `Option`, and nested messages as
//! `Option<Message>`. Transports are free to serialize them however their
//! channel requires; every type derives serde for that purpose.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const COLLECTIONS_SERVICE: &str = "vortex.api.v1.CollectionsService";
pub const POINTS_SERVICE: &str = "vortex.api.v1.PointsService";

/// Structural value, shaped like `google.protobuf.Value`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireValue {
    pub kind: Option<Kind>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    NullValue,
    NumberValue(f64),
    StringValue(String),
    BoolValue(bool),
    StructValue(WireStruct),
    ListValue(WireList),
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireStruct {
    pub fields: HashMap<String, WireValue>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireList {
    pub values: Vec<WireValue>,
}

impl WireValue {
    pub fn from_kind(kind: Kind) -> Self {
        Self { kind: Some(kind) }
    }
}

/// `vortex.api.v1.DistanceMetric`.
pub mod distance_metric {
    pub const UNSPECIFIED: i32 = 0;
    pub const COSINE: i32 = 1;
    pub const EUCLIDEAN_L2: i32 = 2;
}

/// `vortex.api.v1.CollectionStatus`.
pub mod collection_status {
    pub const UNSPECIFIED: i32 = 0;
    pub const GREEN: i32 = 1;
    pub const YELLOW: i32 = 2;
    pub const RED: i32 = 3;
    pub const OPTIMIZING: i32 = 4;
    pub const CREATING: i32 = 5;
}

/// `vortex.api.v1.StatusCode`, the per-point outcome of batch operations.
pub mod point_status {
    pub const UNSPECIFIED: i32 = 0;
    pub const OK: i32 = 1;
    pub const ERROR: i32 = 2;
    pub const NOT_FOUND: i32 = 3;
    pub const INVALID_ARGUMENT: i32 = 4;
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireVector {
    pub elements: Vec<f32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WirePayload {
    pub fields: HashMap<String, WireValue>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WirePointStruct {
    pub id: String,
    pub vector: Option<WireVector>,
    pub payload: Option<WirePayload>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireScoredPoint {
    pub id: String,
    pub vector: Option<WireVector>,
    pub payload: Option<WirePayload>,
    pub score: f32,
    pub version: Option<u64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireFilter {
    pub must_match_exact: HashMap<String, WireValue>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireHnswConfig {
    pub m: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
    pub ml: f64,
    pub seed: Option<u64>,
    pub vector_dim: u32,
    pub m_max0: u32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireSearchParams {
    pub ef_search: Option<u32>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WirePointOperationStatus {
    pub point_id: String,
    pub status_code: i32,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct WireCollectionDescription {
    pub name: String,
    pub vector_count: u64,
    pub status: i32,
    pub dimensions: u32,
    pub distance_metric: i32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateCollectionRequest {
    pub collection_name: String,
    pub vector_dimensions: u32,
    pub distance_metric: i32,
    pub hnsw_config: Option<WireHnswConfig>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct CreateCollectionResponse {}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GetCollectionInfoRequest {
    pub collection_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GetCollectionInfoResponse {
    pub collection_name: String,
    pub status: i32,
    pub vector_count: u64,
    pub segment_count: u64,
    pub disk_size_bytes: u64,
    pub ram_footprint_bytes: u64,
    pub config: Option<WireHnswConfig>,
    pub distance_metric: i32,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ListCollectionsRequest {}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ListCollectionsResponse {
    pub collections: Vec<WireCollectionDescription>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteCollectionRequest {
    pub collection_name: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeleteCollectionResponse {}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertPointsRequest {
    pub collection_name: String,
    pub points: Vec<WirePointStruct>,
    pub wait_flush: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct UpsertPointsResponse {
    pub statuses: Vec<WirePointOperationStatus>,
    pub overall_error: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GetPointsRequest {
    pub collection_name: String,
    pub ids: Vec<String>,
    pub with_payload: Option<bool>,
    pub with_vector: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct GetPointsResponse {
    pub points: Vec<WirePointStruct>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeletePointsRequest {
    pub collection_name: String,
    pub ids: Vec<String>,
    pub wait_flush: Option<bool>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct DeletePointsResponse {
    pub statuses: Vec<WirePointOperationStatus>,
    pub overall_error: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchPointsRequest {
    pub collection_name: String,
    pub query_vector: Option<WireVector>,
    pub k_limit: u32,
    pub filter: Option<WireFilter>,
    pub with_payload: Option<bool>,
    pub with_vector: Option<bool>,
    pub params: Option<WireSearchParams>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchPointsResponse {
    pub results: Vec<WireScoredPoint>,
}

/// One unary request, tagged by the RPC it targets.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "request")]
pub enum WireRequest {
    CreateCollection(CreateCollectionRequest),
    GetCollectionInfo(GetCollectionInfoRequest),
    ListCollections(ListCollectionsRequest),
    DeleteCollection(DeleteCollectionRequest),
    UpsertPoints(UpsertPointsRequest),
    GetPoints(GetPointsRequest),
    DeletePoints(DeletePointsRequest),
    SearchPoints(SearchPointsRequest),
}

impl WireRequest {
    pub fn service(&self) -> &'static str {
        match self {
            WireRequest::CreateCollection(_)
            | WireRequest::GetCollectionInfo(_)
            | WireRequest::ListCollections(_)
            | WireRequest::DeleteCollection(_) => COLLECTIONS_SERVICE,
            WireRequest::UpsertPoints(_)
            | WireRequest::GetPoints(_)
            | WireRequest::DeletePoints(_)
            | WireRequest::SearchPoints(_) => POINTS_SERVICE,
        }
    }

    pub fn rpc_name(&self) -> &'static str {
        match self {
            WireRequest::CreateCollection(_) => "CreateCollection",
            WireRequest::GetCollectionInfo(_) => "GetCollectionInfo",
            WireRequest::ListCollections(_) => "ListCollections",
            WireRequest::DeleteCollection(_) => "DeleteCollection",
            WireRequest::UpsertPoints(_) => "UpsertPoints",
            WireRequest::GetPoints(_) => "GetPoints",
            WireRequest::DeletePoints(_) => "DeletePoints",
            WireRequest::SearchPoints(_) => "SearchPoints",
        }
    }

    /// Full RPC path, e.g. `/vortex.api.v1.PointsService/UpsertPoints`.
    pub fn method(&self) -> String {
        format!("/{}/{}", self.service(), self.rpc_name())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "method", content = "response")]
pub enum WireResponse {
    CreateCollection(CreateCollectionResponse),
    GetCollectionInfo(GetCollectionInfoResponse),
    ListCollections(ListCollectionsResponse),
    DeleteCollection(DeleteCollectionResponse),
    UpsertPoints(UpsertPointsResponse),
    GetPoints(GetPointsResponse),
    DeletePoints(DeletePointsResponse),
    SearchPoints(SearchPointsResponse),
}

impl WireResponse {
    pub fn rpc_name(&self) -> &'static str {
        match self {
            WireResponse::CreateCollection(_) => "CreateCollection",
            WireResponse::GetCollectionInfo(_) => "GetCollectionInfo",
            WireResponse::ListCollections(_) => "ListCollections",
            WireResponse::DeleteCollection(_) => "DeleteCollection",
            WireResponse::UpsertPoints(_) => "UpsertPoints",
            WireResponse::GetPoints(_) => "GetPoints",
            WireResponse::DeletePoints(_) => "DeletePoints",
            WireResponse::SearchPoints(_) => "SearchPoints",
        }
    }
}
