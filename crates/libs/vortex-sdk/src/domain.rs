use crate::error::ApiError;
use crate::value::DynamicValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    EuclideanL2,
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollectionStatus {
    #[default]
    Green,
    Yellow,
    Red,
    Optimizing,
    Creating,
}

/// Outcome of a single point inside a batch operation.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PointStatus {
    Ok,
    #[default]
    Error,
    NotFound,
    InvalidArgument,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Vector {
    pub elements: Vec<f32>,
}

impl From<Vec<f32>> for Vector {
    fn from(elements: Vec<f32>) -> Self {
        Self { elements }
    }
}

/// String-keyed map of arbitrary JSON-like values attached to a point.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Payload {
    pub fields: HashMap<String, DynamicValue>,
}

impl Payload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct PointStruct {
    pub id: String,
    pub vector: Vector,
    pub payload: Option<Payload>,
}

impl PointStruct {
    pub fn new(id: impl Into<String>, elements: Vec<f32>) -> Self {
        Self { id: id.into(), vector: Vector { elements }, payload: None }
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ScoredPoint {
    pub id: String,
    pub vector: Option<Vector>,
    pub payload: Option<Payload>,
    pub score: f32,
    pub version: Option<u64>,
}

/// Exact-match filter applied before the nearest-neighbour search.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Filter {
    pub must_match_exact: Option<HashMap<String, DynamicValue>>,
}

impl Filter {
    pub fn must_match(mut self, key: impl Into<String>, value: impl Into<DynamicValue>) -> Self {
        self.must_match_exact.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct HnswConfig {
    pub m: u32,
    pub ef_construction: u32,
    pub ef_search: u32,
    pub ml: f64,
    pub seed: Option<u64>,
    pub vector_dim: u32,
    pub m_max0: u32,
}

impl HnswConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        let positive = [
            ("hnsw_config.m", self.m),
            ("hnsw_config.ef_construction", self.ef_construction),
            ("hnsw_config.ef_search", self.ef_search),
            ("hnsw_config.vector_dim", self.vector_dim),
            ("hnsw_config.m_max0", self.m_max0),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ApiError::invalid_argument(
                    field,
                    format!("{field} must be greater than zero"),
                ));
            }
        }
        if !(self.ml.is_finite() && self.ml > 0.0) {
            return Err(ApiError::invalid_argument(
                "hnsw_config.ml",
                "hnsw_config.ml must be a positive finite number",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchParams {
    pub ef_search: Option<u32>,
}

impl SearchParams {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.ef_search == Some(0) {
            return Err(ApiError::invalid_argument(
                "params.ef_search",
                "search ef_search must be greater than zero when set",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointOperationStatus {
    pub point_id: String,
    pub status: PointStatus,
    pub error_message: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    pub collection_name: String,
    pub status: CollectionStatus,
    pub vector_count: u64,
    pub segment_count: u64,
    pub disk_size_bytes: u64,
    pub ram_footprint_bytes: u64,
    pub config: HnswConfig,
    pub distance_metric: DistanceMetric,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectionDescription {
    pub name: String,
    pub vector_count: u64,
    pub status: CollectionStatus,
    pub dimensions: u32,
    pub distance_metric: DistanceMetric,
}

/// Selection for `get_points`. Payloads are returned and vectors omitted unless overridden.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PointsQuery {
    pub ids: Vec<String>,
    pub with_payload: Option<bool>,
    pub with_vector: Option<bool>,
}

impl PointsQuery {
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            with_payload: Some(true),
            with_vector: Some(false),
        }
    }

    pub fn with_payload(mut self, with_payload: bool) -> Self {
        self.with_payload = Some(with_payload);
        self
    }

    pub fn with_vector(mut self, with_vector: bool) -> Self {
        self.with_vector = Some(with_vector);
        self
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchQuery {
    pub vector: Vector,
    pub k_limit: u32,
    pub filter: Option<Filter>,
    pub with_payload: Option<bool>,
    pub with_vector: Option<bool>,
    pub params: Option<SearchParams>,
}

impl SearchQuery {
    pub fn new(elements: Vec<f32>, k_limit: u32) -> Self {
        Self {
            vector: Vector { elements },
            k_limit,
            filter: None,
            with_payload: Some(true),
            with_vector: Some(false),
            params: None,
        }
    }

    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn with_params(mut self, params: SearchParams) -> Self {
        self.params = Some(params);
        self
    }

    pub fn with_vector(mut self, with_vector: bool) -> Self {
        self.with_vector = Some(with_vector);
        self
    }

    pub fn with_payload(mut self, with_payload: bool) -> Self {
        self.with_payload = Some(with_payload);
        self
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        if self.k_limit == 0 {
            return Err(ApiError::invalid_argument("k_limit", "k_limit must be greater than zero"));
        }
        if self.vector.elements.is_empty() {
            return Err(ApiError::invalid_argument(
                "query_vector",
                "query vector must not be empty",
            ));
        }
        if let Some(params) = &self.params {
            params.validate()?;
        }
        Ok(())
    }
}
