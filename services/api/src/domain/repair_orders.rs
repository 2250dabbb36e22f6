//! Repair order workflow
//!
//! Orders move freely between statuses. The only rule tied to a transition is
//! the completion date, which [`completion_date`] derives from the previous
//! and next status.

use chrono::{DateTime, Utc};
use common::{ApiError, ApiResult, gate::OrderScope, validation};
use std::sync::Arc;
use tracing::info;

use super::{missing, reference_error};
use crate::{
    models::{
        CreateOrderInput, NewOrder, OrderChanges, OrderStatistics, OrderStatus, RepairOrder,
        UpdateOrderInput, normalize_money,
    },
    repositories::{
        DeviceRepository, RepairOrderRepository, Repositories, ServiceRepository,
        TechnicianRepository,
    },
};

/// Completion date an order should carry after moving to `next`
pub fn completion_date(
    previous: OrderStatus,
    previous_date: Option<DateTime<Utc>>,
    next: OrderStatus,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match (previous, next) {
        (_, status) if status != OrderStatus::Completed => None,
        (OrderStatus::Completed, _) => previous_date.or(Some(now)),
        _ => Some(now),
    }
}

fn parse_status(value: &str) -> ApiResult<OrderStatus> {
    value
        .parse::<OrderStatus>()
        .map_err(|e| ApiError::Validation(e.to_string()))
}

#[derive(Clone)]
pub struct RepairOrders {
    orders: Arc<dyn RepairOrderRepository>,
    devices: Arc<dyn DeviceRepository>,
    services: Arc<dyn ServiceRepository>,
    technicians: Arc<dyn TechnicianRepository>,
}

impl RepairOrders {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            orders: repositories.orders.clone(),
            devices: repositories.devices.clone(),
            services: repositories.services.clone(),
            technicians: repositories.technicians.clone(),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<RepairOrder>> {
        Ok(self.orders.list().await?)
    }

    pub async fn get(&self, id: i32) -> ApiResult<RepairOrder> {
        self.orders
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Repair order", id))
    }

    /// Open a new order in `Received`
    pub async fn create(&self, input: CreateOrderInput) -> ApiResult<RepairOrder> {
        input.validate().map_err(ApiError::Validation)?;
        let total_cost = input.total_cost().map_err(ApiError::Validation)?;

        if self.devices.get(input.device_id).await?.is_none() {
            return Err(missing("Device", input.device_id));
        }
        self.ensure_service(input.service_id).await?;
        self.ensure_technician(input.technician_id).await?;

        let order = NewOrder {
            device_id: input.device_id,
            service_id: input.service_id,
            technician_id: input.technician_id,
            total_cost,
            status: OrderStatus::Received,
            created_date: Utc::now(),
        };

        let id = self.orders.create(&order).await.map_err(|e| {
            reference_error(e, || {
                "Device, service or technician does not exist".to_string()
            })
        })?;
        info!(
            "Repair order {} opened for device {} with technician {}",
            id, order.device_id, order.technician_id
        );
        self.get(id).await
    }

    /// Apply the fields present in `input`; the rest keep their values
    pub async fn update(&self, id: i32, input: UpdateOrderInput) -> ApiResult<RepairOrder> {
        let current = self.get(id).await?;

        let status = match input.status.as_deref() {
            Some(value) => parse_status(value)?,
            None => current.status,
        };
        let total_cost = match &input.total_cost {
            Some(cost) => normalize_money("TotalCost", cost).map_err(ApiError::Validation)?,
            None => current.total_cost.clone(),
        };

        let service_id = match input.service_id {
            Some(service_id) => {
                validation::validate_id("ServiceId", service_id).map_err(ApiError::Validation)?;
                self.ensure_service(service_id).await?;
                service_id
            }
            None => current.service_id,
        };
        let technician_id = match input.technician_id {
            Some(technician_id) => {
                validation::validate_id("TechnicianId", technician_id)
                    .map_err(ApiError::Validation)?;
                self.ensure_technician(technician_id).await?;
                technician_id
            }
            None => current.technician_id,
        };

        let changes = OrderChanges {
            status,
            completed_date: completion_date(
                current.status,
                current.completed_date,
                status,
                Utc::now(),
            ),
            total_cost,
            service_id,
            technician_id,
        };
        self.write(id, &changes).await
    }

    pub async fn update_status(&self, id: i32, status: &str) -> ApiResult<RepairOrder> {
        let status = parse_status(status)?;
        let current = self.get(id).await?;

        let changes = OrderChanges {
            status,
            completed_date: completion_date(
                current.status,
                current.completed_date,
                status,
                Utc::now(),
            ),
            total_cost: current.total_cost,
            service_id: current.service_id,
            technician_id: current.technician_id,
        };
        self.write(id, &changes).await
    }

    pub async fn delete(&self, id: i32) -> ApiResult<bool> {
        Ok(self.orders.delete(id).await?)
    }

    pub async fn by_status(&self, status: &str) -> ApiResult<Vec<RepairOrder>> {
        let status = parse_status(status)?;
        Ok(self.orders.by_status(status).await?)
    }

    pub async fn by_technician(&self, technician_id: i32) -> ApiResult<Vec<RepairOrder>> {
        Ok(self.orders.by_technician(technician_id).await?)
    }

    pub async fn by_client(&self, client_id: i32) -> ApiResult<Vec<RepairOrder>> {
        Ok(self.orders.by_client(client_id).await?)
    }

    /// Orders falling within a caller's "my orders" scope
    pub async fn scoped(&self, scope: OrderScope) -> ApiResult<Vec<RepairOrder>> {
        match scope {
            OrderScope::All => self.list().await,
            OrderScope::Technician(technician_id) => self.by_technician(technician_id).await,
            OrderScope::Client(client_id) => self.by_client(client_id).await,
            OrderScope::Empty => Ok(Vec::new()),
        }
    }

    pub async fn statistics(&self) -> ApiResult<OrderStatistics> {
        Ok(self.orders.statistics().await?)
    }

    async fn write(&self, id: i32, changes: &OrderChanges) -> ApiResult<RepairOrder> {
        self.orders
            .update(id, changes)
            .await
            .map_err(|e| reference_error(e, || "Service or technician does not exist".to_string()))?
            .ok_or_else(|| ApiError::not_found("Repair order", id))?;
        info!("Repair order {} now {}", id, changes.status);
        self.get(id).await
    }

    async fn ensure_service(&self, service_id: i32) -> ApiResult<()> {
        match self.services.get(service_id).await? {
            Some(_) => Ok(()),
            None => Err(missing("Service", service_id)),
        }
    }

    async fn ensure_technician(&self, technician_id: i32) -> ApiResult<()> {
        match self.technicians.get(technician_id).await? {
            Some(_) => Ok(()),
            None => Err(missing("Technician", technician_id)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{Clients, Devices, ServiceCatalog, Technicians},
        models::{ClientInput, DeviceInput, ServiceInput, TechnicianInput},
    };
    use bigdecimal::BigDecimal;
    use chrono::Duration;
    use std::str::FromStr;

    struct Shop {
        orders: RepairOrders,
        device_id: i32,
        service_id: i32,
        technician_id: i32,
        client_id: i32,
    }

    async fn shop() -> Shop {
        let repositories = Repositories::in_memory();
        let client = Clients::new(&repositories)
            .create(ClientInput {
                first_name: "Ivan".to_string(),
                last_name: "Petrov".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        let device = Devices::new(&repositories)
            .create(DeviceInput {
                device_type: "Phone".to_string(),
                brand: "Acme".to_string(),
                model: "X1".to_string(),
                client_id: client.id,
                ..Default::default()
            })
            .await
            .unwrap();
        let service = ServiceCatalog::new(&repositories)
            .create(ServiceInput {
                name: "Screen".to_string(),
                description: String::new(),
                price: BigDecimal::from(50),
            })
            .await
            .unwrap();
        let technician = Technicians::new(&repositories)
            .create(TechnicianInput {
                first_name: "Anna".to_string(),
                last_name: "Smirnova".to_string(),
                specialization: "Phones".to_string(),
                phone: String::new(),
                is_active: true,
            })
            .await
            .unwrap();

        Shop {
            orders: RepairOrders::new(&repositories),
            device_id: device.id,
            service_id: service.id,
            technician_id: technician.id,
            client_id: client.id,
        }
    }

    impl Shop {
        fn order(&self) -> CreateOrderInput {
            CreateOrderInput {
                device_id: self.device_id,
                service_id: self.service_id,
                technician_id: self.technician_id,
                total_cost: None,
            }
        }
    }

    #[test]
    fn test_completion_date() {
        let earlier = Utc::now() - Duration::days(2);
        let now = Utc::now();

        assert_eq!(
            completion_date(OrderStatus::Ready, None, OrderStatus::Completed, now),
            Some(now)
        );
        assert_eq!(
            completion_date(OrderStatus::Completed, Some(earlier), OrderStatus::Completed, now),
            Some(earlier)
        );
        assert_eq!(
            completion_date(OrderStatus::Completed, Some(earlier), OrderStatus::InProgress, now),
            None
        );
        assert_eq!(
            completion_date(OrderStatus::Received, None, OrderStatus::Diagnosing, now),
            None
        );
    }

    #[tokio::test]
    async fn test_create_starts_received_at_zero() {
        let shop = shop().await;
        let order = shop.orders.create(shop.order()).await.unwrap();

        assert_eq!(order.status, OrderStatus::Received);
        assert_eq!(order.total_cost.to_string(), "0.00");
        assert_eq!(order.completed_date, None);
        assert_eq!(order.client_id, shop.client_id);
    }

    #[tokio::test]
    async fn test_create_checks_references() {
        let shop = shop().await;

        let mut input = shop.order();
        input.technician_id = 404;
        assert!(matches!(
            shop.orders.create(input).await,
            Err(ApiError::InvalidReference(_))
        ));

        let mut input = shop.order();
        input.device_id = 404;
        assert!(matches!(
            shop.orders.create(input).await,
            Err(ApiError::InvalidReference(_))
        ));

        assert!(shop.orders.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_completion_lifecycle() {
        let shop = shop().await;
        let order = shop.orders.create(shop.order()).await.unwrap();

        let completed = shop.orders.update_status(order.id, "Completed").await.unwrap();
        assert_eq!(completed.status, OrderStatus::Completed);
        let stamped = completed.completed_date.unwrap();

        let again = shop
            .orders
            .update(
                order.id,
                UpdateOrderInput {
                    total_cost: Some(BigDecimal::from_str("80.5").unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(again.completed_date, Some(stamped));
        assert_eq!(again.total_cost.to_string(), "80.50");

        let reopened = shop.orders.update_status(order.id, "InProgress").await.unwrap();
        assert_eq!(reopened.completed_date, None);
    }

    #[tokio::test]
    async fn test_unknown_status_is_rejected() {
        let shop = shop().await;
        let order = shop.orders.create(shop.order()).await.unwrap();

        assert!(matches!(
            shop.orders.update_status(order.id, "Lost").await,
            Err(ApiError::Validation(_))
        ));
        assert!(matches!(
            shop.orders.by_status("Lost").await,
            Err(ApiError::Validation(_))
        ));
        assert_eq!(
            shop.orders.get(order.id).await.unwrap().status,
            OrderStatus::Received
        );
    }

    #[tokio::test]
    async fn test_update_missing_order() {
        let shop = shop().await;
        assert!(matches!(
            shop.orders.update(7, UpdateOrderInput::default()).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            shop.orders.update_status(7, "Ready").await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_scoped() {
        let shop = shop().await;
        shop.orders.create(shop.order()).await.unwrap();

        assert_eq!(shop.orders.scoped(OrderScope::All).await.unwrap().len(), 1);
        assert_eq!(
            shop.orders
                .scoped(OrderScope::Technician(shop.technician_id))
                .await
                .unwrap()
                .len(),
            1
        );
        assert_eq!(
            shop.orders
                .scoped(OrderScope::Client(shop.client_id))
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(shop.orders.scoped(OrderScope::Client(999)).await.unwrap().is_empty());
        assert!(shop.orders.scoped(OrderScope::Empty).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_statistics_count_completed_revenue() {
        let shop = shop().await;
        let first = shop.orders.create(shop.order()).await.unwrap();
        let mut paid = shop.order();
        paid.total_cost = Some(BigDecimal::from(120));
        let second = shop.orders.create(paid).await.unwrap();

        shop.orders.update_status(first.id, "InProgress").await.unwrap();
        shop.orders.update_status(second.id, "Completed").await.unwrap();

        let stats = shop.orders.statistics().await.unwrap();
        assert_eq!(stats.total_orders, 2);
        assert_eq!(stats.completed_orders, 1);
        assert_eq!(stats.in_progress_orders, 1);
        assert_eq!(stats.total_revenue.to_string(), "120.00");
    }
}
