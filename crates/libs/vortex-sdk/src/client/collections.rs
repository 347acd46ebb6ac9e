use super::*;
use crate::wire::{
    CreateCollectionRequest, DeleteCollectionRequest, GetCollectionInfoRequest,
    ListCollectionsRequest,
};

impl Client {
    pub async fn create_collection(
        &self,
        name: &str,
        dimensions: u32,
        metric: DistanceMetric,
        hnsw_config: Option<HnswConfig>,
    ) -> Result<(), ApiError> {
        validate_collection_name(name)?;
        if dimensions == 0 {
            return Err(ApiError::invalid_argument(
                "vector_dimensions",
                "vector dimensions must be greater than zero",
            ));
        }
        if let Some(config) = &hnsw_config {
            config.validate()?;
        }

        let request = WireRequest::CreateCollection(CreateCollectionRequest {
            collection_name: name.to_owned(),
            vector_dimensions: dimensions,
            distance_metric: convert::distance_metric_to_wire(metric),
            hnsw_config: hnsw_config.as_ref().map(convert::hnsw_config_to_wire),
        });
        let operation = format!("create collection '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::CreateCollection(_) => Ok(()),
            other => Err(unexpected_response("CreateCollection", &other)),
        }
    }

    pub async fn get_collection_info(&self, name: &str) -> Result<CollectionInfo, ApiError> {
        validate_collection_name(name)?;
        let request = WireRequest::GetCollectionInfo(GetCollectionInfoRequest {
            collection_name: name.to_owned(),
        });
        let operation = format!("get collection info for '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::GetCollectionInfo(response) => {
                convert::collection_info_from_wire(response)
            }
            other => Err(unexpected_response("GetCollectionInfo", &other)),
        }
    }

    pub async fn list_collections(&self) -> Result<Vec<CollectionDescription>, ApiError> {
        let request = WireRequest::ListCollections(ListCollectionsRequest::default());
        match self.call("list collections", request).await? {
            WireResponse::ListCollections(response) => Ok(response
                .collections
                .into_iter()
                .map(convert::collection_description_from_wire)
                .collect()),
            other => Err(unexpected_response("ListCollections", &other)),
        }
    }

    pub async fn delete_collection(&self, name: &str) -> Result<(), ApiError> {
        validate_collection_name(name)?;
        let request = WireRequest::DeleteCollection(DeleteCollectionRequest {
            collection_name: name.to_owned(),
        });
        let operation = format!("delete collection '{name}'");
        match self.call(&operation, request).await? {
            WireResponse::DeleteCollection(_) => Ok(()),
            other => Err(unexpected_response("DeleteCollection", &other)),
        }
    }

    pub fn create_collection_with_callback<C>(
        &self,
        name: &str,
        dimensions: u32,
        metric: DistanceMetric,
        hnsw_config: Option<HnswConfig>,
        callback: C,
    ) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<()>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(
            async move { client.create_collection(&name, dimensions, metric, hnsw_config).await },
            callback,
        )
    }

    pub fn get_collection_info_with_callback<C>(&self, name: &str, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<CollectionInfo>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(async move { client.get_collection_info(&name).await }, callback)
    }

    pub fn list_collections_with_callback<C>(&self, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<Vec<CollectionDescription>>) + Send + 'static,
    {
        let client = self.clone();
        spawn_with_callback(async move { client.list_collections().await }, callback)
    }

    pub fn delete_collection_with_callback<C>(&self, name: &str, callback: C) -> JoinHandle<()>
    where
        C: FnOnce(Option<ApiError>, Option<()>) + Send + 'static,
    {
        let client = self.clone();
        let name = name.to_owned();
        spawn_with_callback(async move { client.delete_collection(&name).await }, callback)
    }
}
