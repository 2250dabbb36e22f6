//! Application state shared across handlers

use axum::extract::FromRef;
use common::JwtService;

use crate::{
    domain::{Clients, Devices, RepairOrders, ServiceCatalog, Technicians},
    repositories::Repositories,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub jwt_service: JwtService,
    pub clients: Clients,
    pub devices: Devices,
    pub services: ServiceCatalog,
    pub technicians: Technicians,
    pub orders: RepairOrders,
}

impl AppState {
    pub fn new(repositories: Repositories, jwt_service: JwtService) -> Self {
        Self {
            jwt_service,
            clients: Clients::new(&repositories),
            devices: Devices::new(&repositories),
            services: ServiceCatalog::new(&repositories),
            technicians: Technicians::new(&repositories),
            orders: RepairOrders::new(&repositories),
        }
    }
}

impl FromRef<AppState> for JwtService {
    fn from_ref(state: &AppState) -> Self {
        state.jwt_service.clone()
    }
}
