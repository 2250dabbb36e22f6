//! Device management

use common::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::info;

use super::{missing, reference_error};
use crate::{
    models::{Device, DeviceInput},
    repositories::{ClientRepository, DeviceRepository, Repositories},
};

#[derive(Clone)]
pub struct Devices {
    devices: Arc<dyn DeviceRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl Devices {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            devices: repositories.devices.clone(),
            clients: repositories.clients.clone(),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Device>> {
        Ok(self.devices.list().await?)
    }

    pub async fn get(&self, id: i32) -> ApiResult<Device> {
        self.devices
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Device", id))
    }

    pub async fn by_client(&self, client_id: i32) -> ApiResult<Vec<Device>> {
        Ok(self.devices.by_client(client_id).await?)
    }

    pub async fn create(&self, input: DeviceInput) -> ApiResult<Device> {
        input.validate().map_err(ApiError::Validation)?;
        self.ensure_client(input.client_id).await?;

        let id = self
            .devices
            .create(&input)
            .await
            .map_err(|e| reference_error(e, || missing_client(input.client_id)))?;
        info!("Device {} registered for client {}", id, input.client_id);
        self.get(id).await
    }

    pub async fn update(&self, id: i32, input: DeviceInput) -> ApiResult<Device> {
        input.validate().map_err(ApiError::Validation)?;
        self.get(id).await?;
        self.ensure_client(input.client_id).await?;

        self.devices
            .update(id, &input)
            .await
            .map_err(|e| reference_error(e, || missing_client(input.client_id)))?
            .ok_or_else(|| ApiError::not_found("Device", id))?;
        self.get(id).await
    }

    /// Removes the device and its repair orders
    pub async fn delete(&self, id: i32) -> ApiResult<bool> {
        Ok(self.devices.delete(id).await?)
    }

    async fn ensure_client(&self, client_id: i32) -> ApiResult<()> {
        match self.clients.get(client_id).await? {
            Some(_) => Ok(()),
            None => Err(missing("Client", client_id)),
        }
    }
}

fn missing_client(client_id: i32) -> String {
    format!("Client with id {} does not exist", client_id)
}
