use super::*;
use crate::wire::{DeletePointsRequest, GetPointsRequest, SearchPointsRequest, UpsertPointsRequest};

impl Client {
    /// Inserts or replaces `points`. A server-side overall error fails the
    /// whole batch, whatever the per-point statuses say.
    pub async fn upsert_points(
        &self,
        name: &str,
        points: &[PointStruct],
        wait_flush: Option<bool>,
    ) -> Result<Vec<PointOperationStatus>, ApiError> {
        validate_collection_name(name)?;
        let request = WireRequest::UpsertPoints(UpsertPointsRequest {
            collection_name: name.to_owned(),
            points: points.iter().map(convert::point_to_wire).collect(),
            wait_flush,
        });
        let operation = format!("upsert points in '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::UpsertPoints(response) => {
                reject_overall_error("upsert", response.overall_error)?;
                Ok(response
                    .statuses
                    .into_iter()
                    .map(convert::point_operation_status_from_wire)
                    .collect())
            }
            other => Err(unexpected_response("UpsertPoints", &other)),
        }
    }

    pub async fn get_points(
        &self,
        name: &str,
        query: PointsQuery,
    ) -> Result<Vec<PointStruct>, ApiError> {
        validate_collection_name(name)?;
        let request = WireRequest::GetPoints(GetPointsRequest {
            collection_name: name.to_owned(),
            ids: query.ids,
            with_payload: query.with_payload,
            with_vector: query.with_vector,
        });
        let operation = format!("get points from '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::GetPoints(response) => {
                Ok(response.points.into_iter().map(convert::point_from_wire).collect())
            }
            other => Err(unexpected_response("GetPoints", &other)),
        }
    }

    pub async fn delete_points(
        &self,
        name: &str,
        ids: &[String],
        wait_flush: Option<bool>,
    ) -> Result<Vec<PointOperationStatus>, ApiError> {
        validate_collection_name(name)?;
        let request = WireRequest::DeletePoints(DeletePointsRequest {
            collection_name: name.to_owned(),
            ids: ids.to_vec(),
            wait_flush,
        });
        let operation = format!("delete points from '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::DeletePoints(response) => {
                reject_overall_error("delete", response.overall_error)?;
                Ok(response
                    .statuses
                    .into_iter()
                    .map(convert::point_operation_status_from_wire)
                    .collect())
            }
            other => Err(unexpected_response("DeletePoints", &other)),
        }
    }

    pub async fn search_points(
        &self,
        name: &str,
        query: SearchQuery,
    ) -> Result<Vec<ScoredPoint>, ApiError> {
        validate_collection_name(name)?;
        query.validate()?;
        let request = WireRequest::SearchPoints(SearchPointsRequest {
            collection_name: name.to_owned(),
            query_vector: Some(convert::vector_to_wire(&query.vector)),
            k_limit: query.k_limit,
            filter: query.filter.as_ref().and_then(convert::filter_to_wire),
            with_payload: query.with_payload,
            with_vector: query.with_vector,
            params: query.params.as_ref().and_then(convert::search_params_to_wire),
        });
        let operation = format!("search points in '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::SearchPoints(response) => {
                Ok(response.results.into_iter().map(convert::scored_point_from_wire).collect())
            }
            other => Err(unexpected_response("SearchPoints", &other)),
        }
    }

    pub fn upsert_points_with_callback<C>(
        &self,
        name: &str,
        points: Vec<PointStruct>,
        wait_flush: Option<bool>,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<Vec<PointOperationStatus>>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(
            async move { client.upsert_points(&name, &points, wait_flush).await },
            callback,
        )
    }

    pub fn get_points_with_callback<C>(
        &self,
        name: &str,
        query: PointsQuery,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<Vec<PointStruct>>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(async move { client.get_points(&name, query).await }, callback)
    }

    pub fn delete_points_with_callback<C>(
        &self,
        name: &str,
        ids: Vec<String>,
        wait_flush: Option<bool>,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<Vec<PointOperationStatus>>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(
            async move { client.delete_points(&name, &ids, wait_flush).await },
            callback,
        )
    }

    pub fn search_points_with_callback<C>(
        &self,
        name: &str,
        query: SearchQuery,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<Vec<ScoredPoint>>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(async move { client.search_points(&name, query).await }, callback)
    }
}
