//! Service catalog

use common::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::info;

use crate::{
    models::{PopularQuery, PriceRange, Service, ServiceInput},
    repositories::{Repositories, ServiceRepository},
};

#[derive(Clone)]
pub struct ServiceCatalog {
    services: Arc<dyn ServiceRepository>,
}

impl ServiceCatalog {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            services: repositories.services.clone(),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Service>> {
        Ok(self.services.list().await?)
    }

    pub async fn get(&self, id: i32) -> ApiResult<Service> {
        self.services
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Service", id))
    }

    pub async fn create(&self, input: ServiceInput) -> ApiResult<Service> {
        let input = input.normalized().map_err(ApiError::Validation)?;

        let id = self.services.create(&input).await?;
        info!("Service {} added at {}", id, input.price);
        self.get(id).await
    }

    pub async fn update(&self, id: i32, input: ServiceInput) -> ApiResult<Service> {
        let input = input.normalized().map_err(ApiError::Validation)?;

        self.services
            .update(id, &input)
            .await?
            .ok_or_else(|| ApiError::not_found("Service", id))?;
        self.get(id).await
    }

    pub async fn delete(&self, id: i32) -> ApiResult<bool> {
        Ok(self.services.delete(id).await?)
    }

    /// Inclusive on both bounds, cheapest first
    pub async fn by_price_range(&self, range: PriceRange) -> ApiResult<Vec<Service>> {
        range.validate().map_err(ApiError::Validation)?;
        Ok(self
            .services
            .by_price_range(&range.min_price, &range.max_price)
            .await?)
    }

    pub async fn popular(&self, query: PopularQuery) -> ApiResult<Vec<Service>> {
        let top = query.top().map_err(ApiError::Validation)?;
        Ok(self.services.popular(top).await?)
    }
}
