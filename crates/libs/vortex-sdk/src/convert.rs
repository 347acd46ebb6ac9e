//! Domain model <-> wire message conversion.
//!
//! Enumerations go through closed tables. Wire numbers that are unspecified
//! or unknown to this SDK version map to a fixed default instead of failing.
//! Optional map fields with no entries are left off the request.

use crate::domain::{
    CollectionDescription, CollectionInfo, CollectionStatus, DistanceMetric, Filter, HnswConfig,
    Payload, PointOperationStatus, PointStatus, PointStruct, ScoredPoint, SearchParams, Vector,
};
use crate::error::ApiError;
use crate::value::{decode_fields, encode_fields};
use crate::wire::{
    collection_status, distance_metric, point_status, GetCollectionInfoResponse,
    WireCollectionDescription, WireFilter, WireHnswConfig, WirePayload, WirePointOperationStatus,
    WirePointStruct, WireScoredPoint, WireSearchParams, WireVector,
};

pub fn distance_metric_to_wire(metric: DistanceMetric) -> i32 {
    match metric {
        DistanceMetric::Cosine => distance_metric::COSINE,
        DistanceMetric::EuclideanL2 => distance_metric::EUCLIDEAN_L2,
    }
}

pub fn distance_metric_from_wire(raw: i32) -> DistanceMetric {
    match raw {
        distance_metric::EUCLIDEAN_L2 => DistanceMetric::EuclideanL2,
        // COSINE, also UNSPECIFIED and unknown numbers
        _ => DistanceMetric::Cosine,
    }
}

pub fn collection_status_from_wire(raw: i32) -> CollectionStatus {
    match raw {
        collection_status::YELLOW => CollectionStatus::Yellow,
        collection_status::RED => CollectionStatus::Red,
        collection_status::OPTIMIZING => CollectionStatus::Optimizing,
        collection_status::CREATING => CollectionStatus::Creating,
        // GREEN, also UNSPECIFIED and unknown numbers
        _ => CollectionStatus::Green,
    }
}

pub fn collection_status_to_wire(status: CollectionStatus) -> i32 {
    match status {
        CollectionStatus::Green => collection_status::GREEN,
        CollectionStatus::Yellow => collection_status::YELLOW,
        CollectionStatus::Red => collection_status::RED,
        CollectionStatus::Optimizing => collection_status::OPTIMIZING,
        CollectionStatus::Creating => collection_status::CREATING,
    }
}

pub fn point_status_from_wire(raw: i32) -> PointStatus {
    match raw {
        point_status::OK => PointStatus::Ok,
        point_status::NOT_FOUND => PointStatus::NotFound,
        point_status::INVALID_ARGUMENT => PointStatus::InvalidArgument,
        // ERROR, also UNSPECIFIED and unknown numbers
        _ => PointStatus::Error,
    }
}

pub fn point_status_to_wire(status: PointStatus) -> i32 {
    match status {
        PointStatus::Ok => point_status::OK,
        PointStatus::Error => point_status::ERROR,
        PointStatus::NotFound => point_status::NOT_FOUND,
        PointStatus::InvalidArgument => point_status::INVALID_ARGUMENT,
    }
}

pub fn vector_to_wire(vector: &Vector) -> WireVector {
    WireVector { elements: vector.elements.clone() }
}

pub fn vector_from_wire(vector: WireVector) -> Vector {
    Vector { elements: vector.elements }
}

pub fn payload_to_wire(payload: &Payload) -> Option<WirePayload> {
    if payload.is_empty() {
        return None;
    }
    Some(WirePayload { fields: encode_fields(&payload.fields) })
}

pub fn payload_from_wire(payload: WirePayload) -> Payload {
    Payload { fields: decode_fields(&payload.fields) }
}

pub fn point_to_wire(point: &PointStruct) -> WirePointStruct {
    WirePointStruct {
        id: point.id.clone(),
        vector: Some(vector_to_wire(&point.vector)),
        payload: point.payload.as_ref().and_then(payload_to_wire),
    }
}

pub fn point_from_wire(point: WirePointStruct) -> PointStruct {
    PointStruct {
        id: point.id,
        vector: point.vector.map(vector_from_wire).unwrap_or_default(),
        payload: point.payload.map(payload_from_wire),
    }
}

pub fn scored_point_from_wire(point: WireScoredPoint) -> ScoredPoint {
    ScoredPoint {
        id: point.id,
        vector: point.vector.map(vector_from_wire),
        payload: point.payload.map(payload_from_wire),
        score: point.score,
        version: point.version,
    }
}

pub fn filter_to_wire(filter: &Filter) -> Option<WireFilter> {
    let must_match_exact = filter.must_match_exact.as_ref().filter(|fields| !fields.is_empty())?;
    Some(WireFilter { must_match_exact: encode_fields(must_match_exact) })
}

pub fn search_params_to_wire(params: &SearchParams) -> Option<WireSearchParams> {
    params.ef_search.map(|ef_search| WireSearchParams { ef_search: Some(ef_search) })
}

pub fn hnsw_config_to_wire(config: &HnswConfig) -> WireHnswConfig {
    WireHnswConfig {
        m: config.m,
        ef_construction: config.ef_construction,
        ef_search: config.ef_search,
        ml: config.ml,
        seed: config.seed,
        vector_dim: config.vector_dim,
        m_max0: config.m_max0,
    }
}

pub fn hnsw_config_from_wire(config: WireHnswConfig) -> HnswConfig {
    HnswConfig {
        m: config.m,
        ef_construction: config.ef_construction,
        ef_search: config.ef_search,
        ml: config.ml,
        seed: config.seed,
        vector_dim: config.vector_dim,
        m_max0: config.m_max0,
    }
}

pub fn point_operation_status_from_wire(
    status: WirePointOperationStatus,
) -> PointOperationStatus {
    PointOperationStatus {
        point_id: status.point_id,
        status: point_status_from_wire(status.status_code),
        error_message: status.error_message,
    }
}

pub fn collection_info_from_wire(
    info: GetCollectionInfoResponse,
) -> Result<CollectionInfo, ApiError> {
    let config = info.config.ok_or_else(|| {
        ApiError::decode(format!(
            "collection info for '{}' is missing field 'config'",
            info.collection_name
        ))
    })?;
    Ok(CollectionInfo {
        status: collection_status_from_wire(info.status),
        vector_count: info.vector_count,
        segment_count: info.segment_count,
        disk_size_bytes: info.disk_size_bytes,
        ram_footprint_bytes: info.ram_footprint_bytes,
        config: hnsw_config_from_wire(config),
        distance_metric: distance_metric_from_wire(info.distance_metric),
        collection_name: info.collection_name,
    })
}

pub fn collection_description_from_wire(
    description: WireCollectionDescription,
) -> CollectionDescription {
    CollectionDescription {
        name: description.name,
        vector_count: description.vector_count,
        status: collection_status_from_wire(description.status),
        dimensions: description.dimensions,
        distance_metric: distance_metric_from_wire(description.distance_metric),
    }
}
