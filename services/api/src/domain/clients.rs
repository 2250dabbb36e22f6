//! Client management

use common::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::info;

use crate::{
    models::{Client, ClientInput, Device},
    repositories::{ClientRepository, DeviceRepository, Repositories},
};

#[derive(Clone)]
pub struct Clients {
    clients: Arc<dyn ClientRepository>,
    devices: Arc<dyn DeviceRepository>,
}

impl Clients {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            clients: repositories.clients.clone(),
            devices: repositories.devices.clone(),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Client>> {
        Ok(self.clients.list().await?)
    }

    pub async fn get(&self, id: i32) -> ApiResult<Client> {
        self.clients
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Client", id))
    }

    pub async fn create(&self, input: ClientInput) -> ApiResult<Client> {
        input.validate().map_err(ApiError::Validation)?;

        let id = self.clients.create(&input).await?;
        info!("Client {} created", id);
        self.get(id).await
    }

    pub async fn update(&self, id: i32, input: ClientInput) -> ApiResult<Client> {
        input.validate().map_err(ApiError::Validation)?;

        self.clients
            .update(id, &input)
            .await?
            .ok_or_else(|| ApiError::not_found("Client", id))?;
        self.get(id).await
    }

    /// Removes the client together with its devices and their orders
    pub async fn delete(&self, id: i32) -> ApiResult<bool> {
        let deleted = self.clients.delete(id).await?;
        if deleted {
            info!("Client {} deleted", id);
        }
        Ok(deleted)
    }

    pub async fn devices(&self, client_id: i32) -> ApiResult<Vec<Device>> {
        self.get(client_id).await?;
        Ok(self.devices.by_client(client_id).await?)
    }
}
