//! Business rules for each resource
//!
//! Services here validate input, resolve references and translate storage
//! outcomes into `ApiError`s. Authorization stays in the routes.

use common::{ApiError, DatabaseError};

pub mod clients;
pub mod devices;
pub mod repair_orders;
pub mod services;
pub mod technicians;

pub use clients::Clients;
pub use devices::Devices;
pub use repair_orders::RepairOrders;
pub use services::ServiceCatalog;
pub use technicians::Technicians;

/// A foreign key that failed at write time becomes a client error
fn reference_error(err: DatabaseError, message: impl FnOnce() -> String) -> ApiError {
    match err {
        DatabaseError::ForeignKeyViolation(_) => ApiError::InvalidReference(message()),
        other => ApiError::from(other),
    }
}

fn missing(what: &str, id: i32) -> ApiError {
    ApiError::InvalidReference(format!("{} with id {} does not exist", what, id))
}
