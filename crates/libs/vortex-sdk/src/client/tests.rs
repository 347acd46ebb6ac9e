use super::*;
use crate::domain::{CollectionStatus, Filter, Payload, PointStatus, SearchParams};
use crate::error::{ErrorCategory, StatusCode};
use crate::testing::{ScriptedTransport, Step};
use crate::transport::TransportError;
use crate::wire::{
    point_status, CreateCollectionResponse, GetCollectionInfoResponse, ListCollectionsResponse,
    SearchPointsResponse, UpsertPointsResponse, WireCollectionDescription, WireHnswConfig,
    WirePointOperationStatus, WireScoredPoint,
};
use std::time::Duration;
use tokio::sync::oneshot;

fn fast_retry_config() -> ClientConfig {
    ClientConfig {
        max_retries: 1,
        initial_backoff_ms: 10,
        retry_jitter_fraction: 0.0,
        retryable_status_codes: vec![StatusCode::Unavailable],
        ..ClientConfig::default()
    }
}

fn client_with(
    config: ClientConfig,
    steps: impl IntoIterator<Item = Step>,
) -> (Client, Arc<ScriptedTransport>) {
    let transport = Arc::new(ScriptedTransport::new(steps));
    let client = Client::from_config(config, transport.clone()).expect("valid config");
    (client, transport)
}

fn unavailable() -> TransportError {
    TransportError::new(StatusCode::Unavailable.code(), "connection refused")
}

fn collections_response() -> WireResponse {
    WireResponse::ListCollections(ListCollectionsResponse {
        collections: vec![WireCollectionDescription {
            name: "docs".to_owned(),
            vector_count: 42,
            status: 2,
            dimensions: 3,
            distance_metric: 2,
        }],
    })
}

fn hnsw() -> HnswConfig {
    HnswConfig {
        m: 16,
        ef_construction: 200,
        ef_search: 64,
        ml: 0.36,
        seed: Some(7),
        vector_dim: 3,
        m_max0: 32,
    }
}

#[tokio::test(start_paused = true)]
async fn unavailable_then_success_returns_the_second_response() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Err(unavailable())), Step::respond(Ok(collections_response()))],
    );
    let started = tokio::time::Instant::now();
    let collections = client.list_collections().await.expect("second attempt succeeds");
    assert_eq!(transport.invocation_count(), 2);
    assert_eq!(started.elapsed(), Duration::from_millis(10));
    assert_eq!(
        collections,
        vec![CollectionDescription {
            name: "docs".to_owned(),
            vector_count: 42,
            status: CollectionStatus::Green,
            dimensions: 3,
            distance_metric: DistanceMetric::EuclideanL2,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_the_last_status() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Err(unavailable())), Step::respond(Err(unavailable()))],
    );
    let err = client.delete_collection("docs").await.expect_err("both attempts fail");
    assert_eq!(transport.invocation_count(), 2);
    assert_eq!(err.status_code(), StatusCode::Unavailable);
    assert_eq!(err.attempts(), Some(2));
    assert!(err.message().starts_with("Failed to delete collection 'docs' after 2 attempts"));
}

#[tokio::test(start_paused = true)]
async fn overall_error_fails_the_batch_without_retry() {
    let response = WireResponse::UpsertPoints(UpsertPointsResponse {
        statuses: vec![WirePointOperationStatus {
            point_id: "p1".to_owned(),
            status_code: point_status::OK,
            error_message: None,
        }],
        overall_error: Some("disk full".to_owned()),
    });
    let mut config = fast_retry_config();
    config.retryable_status_codes.push(StatusCode::Unknown);
    let (client, transport) = client_with(config, [Step::respond(Ok(response))]);
    let points = vec![PointStruct::new("p1", vec![0.1, 0.2, 0.3])];
    let err = client.upsert_points("docs", &points, Some(true)).await.expect_err("overall error");
    assert_eq!(err.status_code(), StatusCode::Unknown);
    assert_eq!(err.category(), ErrorCategory::Rejection);
    assert_eq!(err.message(), "Overall error during upsert: disk full");
    assert_eq!(transport.invocation_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_overall_error_is_treated_as_absent() {
    let response = WireResponse::UpsertPoints(UpsertPointsResponse {
        statuses: vec![
            WirePointOperationStatus {
                point_id: "p1".to_owned(),
                status_code: point_status::OK,
                error_message: None,
            },
            WirePointOperationStatus {
                point_id: "p2".to_owned(),
                status_code: 0,
                error_message: Some("bad vector".to_owned()),
            },
        ],
        overall_error: Some(String::new()),
    });
    let (client, _transport) = client_with(fast_retry_config(), [Step::respond(Ok(response))]);
    let points = vec![PointStruct::new("p1", vec![1.0]), PointStruct::new("p2", vec![])];
    let statuses = client.upsert_points("docs", &points, None).await.expect("no overall error");
    assert_eq!(statuses[0].status, PointStatus::Ok);
    assert_eq!(statuses[1].status, PointStatus::Error);
    assert_eq!(statuses[1].error_message.as_deref(), Some("bad vector"));
}

#[tokio::test(start_paused = true)]
async fn close_is_idempotent_and_later_calls_fail_fast() {
    let (client, transport) = client_with(fast_retry_config(), []);
    let clone = client.clone();
    assert!(client.is_connected());
    client.close();
    client.close();
    clone.close();
    assert_eq!(transport.close_count(), 1);
    assert!(!clone.is_connected());

    let err = clone.list_collections().await.expect_err("closed client");
    assert_eq!(err.status_code(), StatusCode::Unavailable);
    assert_eq!(err.category(), ErrorCategory::Connection);
    assert_eq!(err.message(), "client is not connected");
    assert_eq!(transport.invocation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn close_during_backoff_ends_the_operation() {
    let config = ClientConfig { max_retries: 3, ..fast_retry_config() };
    let (client, transport) = client_with(
        config,
        [Step::respond(Err(unavailable())), Step::respond(Ok(collections_response()))],
    );
    let pending = tokio::spawn({
        let client = client.clone();
        async move { client.list_collections().await }
    });

    tokio::time::sleep(Duration::from_millis(5)).await;
    assert_eq!(transport.invocation_count(), 1);
    client.close();

    let err = pending.await.expect("operation task").expect_err("closed during backoff");
    assert_eq!(err.status_code(), StatusCode::Unavailable);
    assert_eq!(err.category(), ErrorCategory::Connection);
    assert_eq!(err.attempts(), Some(2));
    assert!(err.message().contains("client is not connected"));
    assert_eq!(transport.invocation_count(), 1);
    assert_eq!(transport.close_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn metadata_carries_user_agent_and_bearer_key() {
    let config = ClientConfig { api_key: Some("k-123".to_owned()), ..fast_retry_config() };
    let (client, transport) = client_with(config, [Step::respond(Ok(collections_response()))]);
    client.list_collections().await.expect("scripted success");
    let invocation = &transport.invocations()[0];
    assert_eq!(invocation.metadata.get_first("user-agent"), Some(USER_AGENT));
    assert!(USER_AGENT.starts_with("vortex-sdk-rust/"));
    assert_eq!(invocation.metadata.get_first("authorization"), Some("Bearer k-123"));

    let (anonymous, transport) =
        client_with(fast_retry_config(), [Step::respond(Ok(collections_response()))]);
    anonymous.list_collections().await.expect("scripted success");
    assert_eq!(transport.invocations()[0].metadata.get("authorization"), None);
}

#[tokio::test(start_paused = true)]
async fn callback_style_observes_the_same_retries() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Err(unavailable())), Step::respond(Ok(collections_response()))],
    );
    let (sender, receiver) = oneshot::channel();
    client.list_collections_with_callback(move |error, value| {
        let _ = sender.send((error, value));
    });
    let (error, value) = receiver.await.expect("callback invoked");
    assert!(error.is_none());
    assert_eq!(value.map(|collections| collections.len()), Some(1));
    assert_eq!(transport.invocation_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn callback_style_reports_errors_without_a_value() {
    let (client, _transport) = client_with(fast_retry_config(), []);
    client.close();
    let (sender, receiver) = oneshot::channel();
    client
        .delete_collection_with_callback("docs", move |error, value| {
            let _ = sender.send((error, value));
        })
        .await
        .expect("callback task completes");
    let (error, value) = receiver.await.expect("callback invoked");
    assert_eq!(error.map(|err| err.status_code()), Some(StatusCode::Unavailable));
    assert_eq!(value, None);
}

#[tokio::test(start_paused = true)]
async fn empty_filter_is_omitted_from_search_requests() {
    let response = WireResponse::SearchPoints(SearchPointsResponse {
        results: vec![WireScoredPoint {
            id: "p1".to_owned(),
            vector: None,
            payload: None,
            score: 0.9,
            version: Some(3),
        }],
    });
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Ok(response.clone())), Step::respond(Ok(response))],
    );

    let query = SearchQuery::new(vec![0.1, 0.2, 0.3], 5).with_filter(Filter::default());
    let results = client.search_points("docs", query).await.expect("search succeeds");
    assert_eq!(results[0].id, "p1");
    assert_eq!(results[0].version, Some(3));

    let query = SearchQuery::new(vec![0.1, 0.2, 0.3], 5)
        .with_filter(Filter::default().must_match("lang", "en"))
        .with_params(SearchParams { ef_search: Some(128) });
    client.search_points("docs", query).await.expect("search succeeds");

    let invocations = transport.invocations();
    let WireRequest::SearchPoints(unfiltered) = &invocations[0].request else {
        panic!("expected a search request");
    };
    assert_eq!(unfiltered.filter, None);
    assert_eq!(unfiltered.params, None);
    assert_eq!(unfiltered.with_payload, Some(true));
    assert_eq!(unfiltered.with_vector, Some(false));

    let WireRequest::SearchPoints(filtered) = &invocations[1].request else {
        panic!("expected a search request");
    };
    assert_eq!(filtered.filter.as_ref().map(|filter| filter.must_match_exact.len()), Some(1));
    assert_eq!(filtered.params.as_ref().and_then(|params| params.ef_search), Some(128));
}

#[tokio::test(start_paused = true)]
async fn payloads_are_encoded_and_empty_ones_dropped() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Ok(WireResponse::UpsertPoints(UpsertPointsResponse::default())))],
    );
    let points = vec![
        PointStruct::new("a", vec![1.0]).with_payload(Payload::new().with("lang", "en")),
        PointStruct::new("b", vec![2.0]).with_payload(Payload::new()),
    ];
    client.upsert_points("docs", &points, None).await.expect("upsert succeeds");
    let WireRequest::UpsertPoints(request) = &transport.invocations()[0].request else {
        panic!("expected an upsert request");
    };
    assert!(request.points[0].payload.is_some());
    assert!(request.points[1].payload.is_none());
}

#[tokio::test(start_paused = true)]
async fn invalid_arguments_never_reach_the_transport() {
    let (client, transport) = client_with(fast_retry_config(), []);

    let err = client.delete_collection("  ").await.expect_err("blank name");
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = client
        .create_collection("docs", 0, DistanceMetric::Cosine, None)
        .await
        .expect_err("zero dimensions");
    assert_eq!(err.status_code(), StatusCode::InvalidArgument);

    let bad_hnsw = HnswConfig { m: 0, ..hnsw() };
    let err = client
        .create_collection("docs", 3, DistanceMetric::Cosine, Some(bad_hnsw))
        .await
        .expect_err("zero m");
    assert_eq!(err.details(), Some("field 'hnsw_config.m'"));

    let err = client
        .search_points("docs", SearchQuery::new(vec![1.0], 0))
        .await
        .expect_err("zero k");
    assert_eq!(err.category(), ErrorCategory::Validation);

    let err = client
        .search_points(
            "docs",
            SearchQuery::new(vec![1.0], 3).with_params(SearchParams { ef_search: Some(0) }),
        )
        .await
        .expect_err("zero ef_search");
    assert_eq!(err.category(), ErrorCategory::Validation);

    assert_eq!(transport.invocation_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn create_collection_maps_metric_and_config() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [Step::respond(Ok(WireResponse::CreateCollection(CreateCollectionResponse {})))],
    );
    client
        .create_collection("docs", 3, DistanceMetric::EuclideanL2, Some(hnsw()))
        .await
        .expect("create succeeds");
    let invocation = &transport.invocations()[0];
    assert_eq!(invocation.method, "/vortex.api.v1.CollectionsService/CreateCollection");
    let WireRequest::CreateCollection(request) = &invocation.request else {
        panic!("expected a create request");
    };
    assert_eq!(request.distance_metric, 2);
    assert_eq!(request.hnsw_config.as_ref().map(|config| config.m), Some(16));
}

#[tokio::test(start_paused = true)]
async fn collection_info_defaults_unspecified_enums() {
    let response = WireResponse::GetCollectionInfo(GetCollectionInfoResponse {
        collection_name: "docs".to_owned(),
        status: 0,
        vector_count: 10,
        segment_count: 1,
        disk_size_bytes: 4096,
        ram_footprint_bytes: 2048,
        config: Some(WireHnswConfig {
            m: 16,
            ef_construction: 200,
            ef_search: 64,
            ml: 0.36,
            seed: Some(7),
            vector_dim: 3,
            m_max0: 32,
        }),
        distance_metric: 0,
    });
    let (client, _transport) = client_with(fast_retry_config(), [Step::respond(Ok(response))]);
    let info = client.get_collection_info("docs").await.expect("info");
    assert_eq!(info.status, CollectionStatus::Green);
    assert_eq!(info.distance_metric, DistanceMetric::Cosine);
    assert_eq!(info.config, hnsw());
}

#[tokio::test(start_paused = true)]
async fn mismatched_or_incomplete_responses_are_decode_errors() {
    let (client, transport) = client_with(
        fast_retry_config(),
        [
            Step::respond(Ok(WireResponse::CreateCollection(CreateCollectionResponse {}))),
            Step::respond(Ok(WireResponse::GetCollectionInfo(Default::default()))),
        ],
    );
    let err = client.list_collections().await.expect_err("wrong variant");
    assert_eq!(err.category(), ErrorCategory::Decode);
    assert_eq!(err.status_code(), StatusCode::Internal);

    let err = client.get_collection_info("docs").await.expect_err("missing config");
    assert_eq!(err.category(), ErrorCategory::Decode);
    assert_eq!(transport.invocation_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn client_timeout_ends_the_operation() {
    let mut config = ClientConfig {
        client_side_timeout_ms: Some(50),
        per_call_deadline_ms: Some(200),
        ..fast_retry_config()
    };
    config.retryable_status_codes.push(StatusCode::Cancelled);
    let (client, transport) =
        client_with(config, [Step::Hang, Step::respond(Ok(collections_response()))]);
    let started = tokio::time::Instant::now();
    let err = client.list_collections().await.expect_err("timeout");
    assert_eq!(started.elapsed(), Duration::from_millis(50));
    assert!(err.is_client_timeout());
    assert_eq!(err.status_code(), StatusCode::Cancelled);
    assert_eq!(err.attempts(), Some(1));
    assert_eq!(transport.invocation_count(), 1);
    assert_eq!(transport.cancel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn dropping_an_operation_cancels_the_call() {
    let (client, transport) = client_with(fast_retry_config(), [Step::Hang]);
    let outcome = tokio::time::timeout(Duration::from_millis(20), client.list_collections()).await;
    assert!(outcome.is_err());
    assert_eq!(transport.invocation_count(), 1);
    assert_eq!(transport.cancel_count(), 1);
}
