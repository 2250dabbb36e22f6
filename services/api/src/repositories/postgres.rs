//! PostgreSQL repositories
//!
//! Computed view columns (counts, joined names) are produced in SQL so every
//! read is a single query.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use common::DatabaseResult;
use sqlx::PgPool;
use tracing::info;

use super::{
    ClientRepository, DeviceRepository, RepairOrderRepository, ServiceRepository,
    TechnicianRepository,
};
use crate::models::{
    Client, ClientInput, Device, DeviceInput, NewOrder, OrderChanges, OrderStatistics,
    OrderStatus, RepairOrder, Service, ServiceInput, Technician, TechnicianInput,
};

const CLIENT_SELECT: &str = r#"
    SELECT c.id, c.first_name, c.last_name, c.phone, c.email,
           (SELECT COUNT(*) FROM devices d WHERE d.client_id = c.id) AS devices_count
    FROM clients c
"#;

const DEVICE_SELECT: &str = r#"
    SELECT d.id, d.type, d.brand, d.model, d.serial_number, d.problem_description,
           d.client_id, c.first_name || ' ' || c.last_name AS client_name
    FROM devices d
    JOIN clients c ON c.id = d.client_id
"#;

const SERVICE_SELECT: &str = r#"
    SELECT s.id, s.name, s.description, s.price,
           (SELECT COUNT(*) FROM repair_orders o WHERE o.service_id = s.id) AS orders_count
    FROM services s
"#;

const TECHNICIAN_SELECT: &str = r#"
    SELECT t.id, t.first_name, t.last_name, t.specialization, t.phone, t.is_active,
           (SELECT COUNT(*) FROM repair_orders o WHERE o.technician_id = t.id) AS orders_count,
           (SELECT COUNT(*) FROM repair_orders o
             WHERE o.technician_id = t.id AND o.status <> 'Completed') AS active_orders_count
    FROM technicians t
"#;

const ORDER_SELECT: &str = r#"
    SELECT o.id, o.created_date, o.completed_date, o.total_cost, o.status,
           o.device_id, o.service_id, o.technician_id,
           d.brand || ' ' || d.model AS device_info,
           s.name AS service_name,
           t.first_name || ' ' || t.last_name AS technician_name,
           c.first_name || ' ' || c.last_name AS client_name,
           c.id AS client_id
    FROM repair_orders o
    JOIN devices d ON d.id = o.device_id
    JOIN clients c ON c.id = d.client_id
    JOIN services s ON s.id = o.service_id
    JOIN technicians t ON t.id = o.technician_id
"#;

async fn delete_by_id(pool: &PgPool, table: &str, id: i32) -> DatabaseResult<bool> {
    let result = sqlx::query(&format!("DELETE FROM {table} WHERE id = $1"))
        .bind(id)
        .execute(pool)
        .await?;

    let deleted = result.rows_affected() > 0;
    if deleted {
        info!("Deleted {} row {}", table, id);
    }
    Ok(deleted)
}

/// Client repository
#[derive(Clone)]
pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn list(&self) -> DatabaseResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(&format!("{CLIENT_SELECT} ORDER BY c.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(clients)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>(&format!("{CLIENT_SELECT} WHERE c.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn create(&self, input: &ClientInput) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO clients (first_name, last_name, phone, email)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_one(&self.pool)
        .await?;

        info!("Created client {}", id);
        Ok(id)
    }

    async fn update(&self, id: i32, input: &ClientInput) -> DatabaseResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE clients
            SET first_name = $2, last_name = $3, phone = $4, email = $5
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .bind(&input.email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        delete_by_id(&self.pool, "clients", id).await
    }
}

/// Device repository
#[derive(Clone)]
pub struct PgDeviceRepository {
    pool: PgPool,
}

impl PgDeviceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DeviceRepository for PgDeviceRepository {
    async fn list(&self) -> DatabaseResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(&format!("{DEVICE_SELECT} ORDER BY d.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(devices)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Device>> {
        let device = sqlx::query_as::<_, Device>(&format!("{DEVICE_SELECT} WHERE d.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(device)
    }

    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<Device>> {
        let devices = sqlx::query_as::<_, Device>(&format!(
            "{DEVICE_SELECT} WHERE d.client_id = $1 ORDER BY d.id"
        ))
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(devices)
    }

    async fn create(&self, input: &DeviceInput) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO devices (type, brand, model, serial_number, problem_description, client_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&input.device_type)
        .bind(&input.brand)
        .bind(&input.model)
        .bind(&input.serial_number)
        .bind(&input.problem_description)
        .bind(input.client_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Created device {} for client {}", id, input.client_id);
        Ok(id)
    }

    async fn update(&self, id: i32, input: &DeviceInput) -> DatabaseResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE devices
            SET type = $2, brand = $3, model = $4, serial_number = $5,
                problem_description = $6, client_id = $7
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.device_type)
        .bind(&input.brand)
        .bind(&input.model)
        .bind(&input.serial_number)
        .bind(&input.problem_description)
        .bind(input.client_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        delete_by_id(&self.pool, "devices", id).await
    }
}

/// Service catalog repository
#[derive(Clone)]
pub struct PgServiceRepository {
    pool: PgPool,
}

impl PgServiceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ServiceRepository for PgServiceRepository {
    async fn list(&self) -> DatabaseResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(&format!("{SERVICE_SELECT} ORDER BY s.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(services)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Service>> {
        let service = sqlx::query_as::<_, Service>(&format!("{SERVICE_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(service)
    }

    async fn by_price_range(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
    ) -> DatabaseResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "{SERVICE_SELECT} WHERE s.price BETWEEN $1 AND $2 ORDER BY s.price, s.id"
        ))
        .bind(min)
        .bind(max)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    async fn popular(&self, top: i64) -> DatabaseResult<Vec<Service>> {
        let services = sqlx::query_as::<_, Service>(&format!(
            "{SERVICE_SELECT} ORDER BY orders_count DESC, s.id LIMIT $1"
        ))
        .bind(top)
        .fetch_all(&self.pool)
        .await?;
        Ok(services)
    }

    async fn create(&self, input: &ServiceInput) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO services (name, description, price)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.price)
        .fetch_one(&self.pool)
        .await?;

        info!("Created service {}", id);
        Ok(id)
    }

    async fn update(&self, id: i32, input: &ServiceInput) -> DatabaseResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE services
            SET name = $2, description = $3, price = $4
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.price)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        delete_by_id(&self.pool, "services", id).await
    }
}

/// Technician repository
#[derive(Clone)]
pub struct PgTechnicianRepository {
    pool: PgPool,
}

impl PgTechnicianRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TechnicianRepository for PgTechnicianRepository {
    async fn list(&self) -> DatabaseResult<Vec<Technician>> {
        let technicians =
            sqlx::query_as::<_, Technician>(&format!("{TECHNICIAN_SELECT} ORDER BY t.id"))
                .fetch_all(&self.pool)
                .await?;
        Ok(technicians)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Technician>> {
        let technician =
            sqlx::query_as::<_, Technician>(&format!("{TECHNICIAN_SELECT} WHERE t.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(technician)
    }

    async fn by_specialization(&self, text: &str) -> DatabaseResult<Vec<Technician>> {
        let technicians = sqlx::query_as::<_, Technician>(&format!(
            "{TECHNICIAN_SELECT} WHERE STRPOS(LOWER(t.specialization), LOWER($1)) > 0 ORDER BY t.id"
        ))
        .bind(text)
        .fetch_all(&self.pool)
        .await?;
        Ok(technicians)
    }

    async fn active(&self) -> DatabaseResult<Vec<Technician>> {
        let technicians = sqlx::query_as::<_, Technician>(&format!(
            "{TECHNICIAN_SELECT} WHERE t.is_active ORDER BY t.id"
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(technicians)
    }

    async fn create(&self, input: &TechnicianInput) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO technicians (first_name, last_name, specialization, phone, is_active)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.specialization)
        .bind(&input.phone)
        .bind(input.is_active)
        .fetch_one(&self.pool)
        .await?;

        info!("Created technician {}", id);
        Ok(id)
    }

    async fn update(&self, id: i32, input: &TechnicianInput) -> DatabaseResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE technicians
            SET first_name = $2, last_name = $3, specialization = $4, phone = $5, is_active = $6
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.specialization)
        .bind(&input.phone)
        .bind(input.is_active)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        delete_by_id(&self.pool, "technicians", id).await
    }
}

/// Repair order repository
#[derive(Clone)]
pub struct PgRepairOrderRepository {
    pool: PgPool,
}

impl PgRepairOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(&self, filter: &str, value: &str) -> DatabaseResult<Vec<RepairOrder>> {
        let orders = sqlx::query_as::<_, RepairOrder>(&format!(
            "{ORDER_SELECT} WHERE {filter} ORDER BY o.id"
        ))
        .bind(value)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    async fn fetch_where_id(&self, filter: &str, id: i32) -> DatabaseResult<Vec<RepairOrder>> {
        let orders = sqlx::query_as::<_, RepairOrder>(&format!(
            "{ORDER_SELECT} WHERE {filter} ORDER BY o.id"
        ))
        .bind(id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }
}

#[async_trait]
impl RepairOrderRepository for PgRepairOrderRepository {
    async fn list(&self) -> DatabaseResult<Vec<RepairOrder>> {
        let orders = sqlx::query_as::<_, RepairOrder>(&format!("{ORDER_SELECT} ORDER BY o.id"))
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<RepairOrder>> {
        let order = sqlx::query_as::<_, RepairOrder>(&format!("{ORDER_SELECT} WHERE o.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }

    async fn by_status(&self, status: OrderStatus) -> DatabaseResult<Vec<RepairOrder>> {
        self.fetch_where("o.status = $1", status.as_str()).await
    }

    async fn by_technician(&self, technician_id: i32) -> DatabaseResult<Vec<RepairOrder>> {
        self.fetch_where_id("o.technician_id = $1", technician_id)
            .await
    }

    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<RepairOrder>> {
        self.fetch_where_id("d.client_id = $1", client_id).await
    }

    async fn create(&self, order: &NewOrder) -> DatabaseResult<i32> {
        let id: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO repair_orders
                (created_date, total_cost, status, device_id, service_id, technician_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(order.created_date)
        .bind(&order.total_cost)
        .bind(order.status.as_str())
        .bind(order.device_id)
        .bind(order.service_id)
        .bind(order.technician_id)
        .fetch_one(&self.pool)
        .await?;

        info!("Created repair order {} for device {}", id, order.device_id);
        Ok(id)
    }

    async fn update(&self, id: i32, changes: &OrderChanges) -> DatabaseResult<Option<i32>> {
        let id: Option<i32> = sqlx::query_scalar(
            r#"
            UPDATE repair_orders
            SET status = $2, completed_date = $3, total_cost = $4,
                service_id = $5, technician_id = $6
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(changes.status.as_str())
        .bind(changes.completed_date)
        .bind(&changes.total_cost)
        .bind(changes.service_id)
        .bind(changes.technician_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        delete_by_id(&self.pool, "repair_orders", id).await
    }

    async fn statistics(&self) -> DatabaseResult<OrderStatistics> {
        let statistics = sqlx::query_as::<_, OrderStatistics>(
            r#"
            SELECT COUNT(*) AS total_orders,
                   COUNT(*) FILTER (WHERE status = 'Completed') AS completed_orders,
                   COUNT(*) FILTER (WHERE status = 'InProgress') AS in_progress_orders,
                   COALESCE(SUM(total_cost) FILTER (WHERE status = 'Completed'), 0)::NUMERIC(14, 2)
                       AS total_revenue
            FROM repair_orders
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(statistics)
    }
}
