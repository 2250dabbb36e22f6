//! Data access for the shop's resources
//!
//! One trait per entity. Reads return the joined views from `models`, with
//! computed counts and names filled in. Writes return the id of the affected
//! row (or `None` when it does not exist) and callers re-read the view.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use common::DatabaseResult;
use sqlx::PgPool;
use std::sync::Arc;

use crate::models::{
    Client, ClientInput, Device, DeviceInput, NewOrder, OrderChanges, OrderStatistics,
    OrderStatus, RepairOrder, Service, ServiceInput, Technician, TechnicianInput,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<Client>>;
    async fn get(&self, id: i32) -> DatabaseResult<Option<Client>>;
    async fn create(&self, input: &ClientInput) -> DatabaseResult<i32>;
    async fn update(&self, id: i32, input: &ClientInput) -> DatabaseResult<Option<i32>>;
    /// Removes the client with its devices and their orders
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait DeviceRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<Device>>;
    async fn get(&self, id: i32) -> DatabaseResult<Option<Device>>;
    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<Device>>;
    async fn create(&self, input: &DeviceInput) -> DatabaseResult<i32>;
    async fn update(&self, id: i32, input: &DeviceInput) -> DatabaseResult<Option<i32>>;
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait ServiceRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<Service>>;
    async fn get(&self, id: i32) -> DatabaseResult<Option<Service>>;
    /// Services priced within `[min, max]`, cheapest first
    async fn by_price_range(&self, min: &BigDecimal, max: &BigDecimal)
    -> DatabaseResult<Vec<Service>>;
    /// The `top` most ordered services; ties go to the lower id
    async fn popular(&self, top: i64) -> DatabaseResult<Vec<Service>>;
    async fn create(&self, input: &ServiceInput) -> DatabaseResult<i32>;
    async fn update(&self, id: i32, input: &ServiceInput) -> DatabaseResult<Option<i32>>;
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait TechnicianRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<Technician>>;
    async fn get(&self, id: i32) -> DatabaseResult<Option<Technician>>;
    /// Case-insensitive substring match
    async fn by_specialization(&self, text: &str) -> DatabaseResult<Vec<Technician>>;
    async fn active(&self) -> DatabaseResult<Vec<Technician>>;
    async fn create(&self, input: &TechnicianInput) -> DatabaseResult<i32>;
    async fn update(&self, id: i32, input: &TechnicianInput) -> DatabaseResult<Option<i32>>;
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
}

#[async_trait]
pub trait RepairOrderRepository: Send + Sync {
    async fn list(&self) -> DatabaseResult<Vec<RepairOrder>>;
    async fn get(&self, id: i32) -> DatabaseResult<Option<RepairOrder>>;
    async fn by_status(&self, status: OrderStatus) -> DatabaseResult<Vec<RepairOrder>>;
    async fn by_technician(&self, technician_id: i32) -> DatabaseResult<Vec<RepairOrder>>;
    /// Orders for any device owned by the client
    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<RepairOrder>>;
    async fn create(&self, order: &NewOrder) -> DatabaseResult<i32>;
    async fn update(&self, id: i32, changes: &OrderChanges) -> DatabaseResult<Option<i32>>;
    async fn delete(&self, id: i32) -> DatabaseResult<bool>;
    async fn statistics(&self) -> DatabaseResult<OrderStatistics>;
}

/// Every repository the api service needs, backed by one store
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<dyn ClientRepository>,
    pub devices: Arc<dyn DeviceRepository>,
    pub services: Arc<dyn ServiceRepository>,
    pub technicians: Arc<dyn TechnicianRepository>,
    pub orders: Arc<dyn RepairOrderRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            clients: Arc::new(postgres::PgClientRepository::new(pool.clone())),
            devices: Arc::new(postgres::PgDeviceRepository::new(pool.clone())),
            services: Arc::new(postgres::PgServiceRepository::new(pool.clone())),
            technicians: Arc::new(postgres::PgTechnicianRepository::new(pool.clone())),
            orders: Arc::new(postgres::PgRepairOrderRepository::new(pool)),
        }
    }

    /// Fresh, empty process-local tables
    pub fn in_memory() -> Self {
        let store = MemoryStore::new();
        Self {
            clients: Arc::new(store.clone()),
            devices: Arc::new(store.clone()),
            services: Arc::new(store.clone()),
            technicians: Arc::new(store.clone()),
            orders: Arc::new(store),
        }
    }
}
