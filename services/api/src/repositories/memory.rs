//! Process-local store implementing every repository
//!
//! All tables live behind one lock, so multi-table operations (cascading
//! deletes, computed counts) see a consistent snapshot. Foreign keys and
//! `ON DELETE CASCADE` are enforced the way the migration declares them.

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use common::{DatabaseError, DatabaseResult};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{
    ClientRepository, DeviceRepository, RepairOrderRepository, ServiceRepository,
    TechnicianRepository,
};
use crate::models::{
    Client, ClientInput, Device, DeviceInput, NewOrder, OrderChanges, OrderStatistics,
    OrderStatus, RepairOrder, Service, ServiceInput, Technician, TechnicianInput,
};

#[derive(Debug, Clone)]
struct ClientRow {
    first_name: String,
    last_name: String,
    phone: String,
    email: String,
}

#[derive(Debug, Clone)]
struct DeviceRow {
    device_type: String,
    brand: String,
    model: String,
    serial_number: String,
    problem_description: String,
    client_id: i32,
}

#[derive(Debug, Clone)]
struct ServiceRow {
    name: String,
    description: String,
    price: BigDecimal,
}

#[derive(Debug, Clone)]
struct TechnicianRow {
    first_name: String,
    last_name: String,
    specialization: String,
    phone: String,
    is_active: bool,
}

#[derive(Debug, Clone)]
struct OrderRow {
    created_date: DateTime<Utc>,
    completed_date: Option<DateTime<Utc>>,
    total_cost: BigDecimal,
    status: OrderStatus,
    device_id: i32,
    service_id: i32,
    technician_id: i32,
}

/// Rows keyed by id, plus the id sequence
#[derive(Debug)]
struct Table<R> {
    last_id: i32,
    rows: BTreeMap<i32, R>,
}

impl<R> Default for Table<R> {
    fn default() -> Self {
        Self {
            last_id: 0,
            rows: BTreeMap::new(),
        }
    }
}

impl<R> Table<R> {
    fn insert(&mut self, row: R) -> i32 {
        self.last_id += 1;
        self.rows.insert(self.last_id, row);
        self.last_id
    }

    fn contains(&self, id: i32) -> bool {
        self.rows.contains_key(&id)
    }
}

#[derive(Debug, Default)]
struct Tables {
    clients: Table<ClientRow>,
    devices: Table<DeviceRow>,
    services: Table<ServiceRow>,
    technicians: Table<TechnicianRow>,
    orders: Table<OrderRow>,
}

fn missing_reference(constraint: &str) -> DatabaseError {
    DatabaseError::ForeignKeyViolation(constraint.to_string())
}

impl Tables {
    fn client(&self, id: i32) -> Option<Client> {
        let row = self.clients.rows.get(&id)?;
        let devices_count = self
            .devices
            .rows
            .values()
            .filter(|d| d.client_id == id)
            .count() as i64;

        Some(Client {
            id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            phone: row.phone.clone(),
            email: row.email.clone(),
            devices_count,
        })
    }

    fn device(&self, id: i32) -> Option<Device> {
        let row = self.devices.rows.get(&id)?;
        let owner = self.clients.rows.get(&row.client_id)?;

        Some(Device {
            id,
            device_type: row.device_type.clone(),
            brand: row.brand.clone(),
            model: row.model.clone(),
            serial_number: row.serial_number.clone(),
            problem_description: row.problem_description.clone(),
            client_id: row.client_id,
            client_name: format!("{} {}", owner.first_name, owner.last_name),
        })
    }

    fn service(&self, id: i32) -> Option<Service> {
        let row = self.services.rows.get(&id)?;
        let orders_count = self
            .orders
            .rows
            .values()
            .filter(|o| o.service_id == id)
            .count() as i64;

        Some(Service {
            id,
            name: row.name.clone(),
            description: row.description.clone(),
            price: row.price.clone(),
            orders_count,
        })
    }

    fn technician(&self, id: i32) -> Option<Technician> {
        let row = self.technicians.rows.get(&id)?;
        let assigned = self.orders.rows.values().filter(|o| o.technician_id == id);
        let (orders_count, active_orders_count) =
            assigned.fold((0, 0), |(all, active), order| {
                let open = i64::from(order.status != OrderStatus::Completed);
                (all + 1, active + open)
            });

        Some(Technician {
            id,
            first_name: row.first_name.clone(),
            last_name: row.last_name.clone(),
            specialization: row.specialization.clone(),
            phone: row.phone.clone(),
            is_active: row.is_active,
            orders_count,
            active_orders_count,
        })
    }

    fn order(&self, id: i32) -> Option<RepairOrder> {
        let row = self.orders.rows.get(&id)?;
        let device = self.devices.rows.get(&row.device_id)?;
        let client = self.clients.rows.get(&device.client_id)?;
        let service = self.services.rows.get(&row.service_id)?;
        let technician = self.technicians.rows.get(&row.technician_id)?;

        Some(RepairOrder {
            id,
            created_date: row.created_date,
            completed_date: row.completed_date,
            total_cost: row.total_cost.clone(),
            status: row.status,
            device_id: row.device_id,
            service_id: row.service_id,
            technician_id: row.technician_id,
            device_info: format!("{} {}", device.brand, device.model),
            service_name: service.name.clone(),
            technician_name: format!("{} {}", technician.first_name, technician.last_name),
            client_name: format!("{} {}", client.first_name, client.last_name),
            client_id: device.client_id,
        })
    }

    fn orders_where(&self, keep: impl Fn(&RepairOrder) -> bool) -> Vec<RepairOrder> {
        self.orders
            .rows
            .keys()
            .filter_map(|id| self.order(*id))
            .filter(|order| keep(order))
            .collect()
    }

    fn technicians_where(&self, keep: impl Fn(&Technician) -> bool) -> Vec<Technician> {
        self.technicians
            .rows
            .keys()
            .filter_map(|id| self.technician(*id))
            .filter(|technician| keep(technician))
            .collect()
    }

    fn services(&self) -> Vec<Service> {
        self.services
            .rows
            .keys()
            .filter_map(|id| self.service(*id))
            .collect()
    }

    fn remove_orders(&mut self, doomed: impl Fn(&OrderRow) -> bool) {
        self.orders.rows.retain(|_, order| !doomed(order));
    }

    fn check_order_references(
        &self,
        device_id: i32,
        service_id: i32,
        technician_id: i32,
    ) -> DatabaseResult<()> {
        if !self.devices.contains(device_id) {
            return Err(missing_reference("repair_orders_device_id_fkey"));
        }
        if !self.services.contains(service_id) {
            return Err(missing_reference("repair_orders_service_id_fkey"));
        }
        if !self.technicians.contains(technician_id) {
            return Err(missing_reference("repair_orders_technician_id_fkey"));
        }
        Ok(())
    }
}

/// In-memory tables shared by clones
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Client>> {
        let tables = self.tables.read().await;
        Ok(tables
            .clients
            .rows
            .keys()
            .filter_map(|id| tables.client(*id))
            .collect())
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Client>> {
        Ok(self.tables.read().await.client(id))
    }

    async fn create(&self, input: &ClientInput) -> DatabaseResult<i32> {
        let mut tables = self.tables.write().await;
        Ok(tables.clients.insert(ClientRow {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            phone: input.phone.clone(),
            email: input.email.clone(),
        }))
    }

    async fn update(&self, id: i32, input: &ClientInput) -> DatabaseResult<Option<i32>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.clients.rows.get_mut(&id) else {
            return Ok(None);
        };

        row.first_name = input.first_name.clone();
        row.last_name = input.last_name.clone();
        row.phone = input.phone.clone();
        row.email = input.email.clone();
        Ok(Some(id))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.clients.rows.remove(&id).is_none() {
            return Ok(false);
        }

        let devices: HashSet<i32> = tables
            .devices
            .rows
            .iter()
            .filter(|(_, device)| device.client_id == id)
            .map(|(device_id, _)| *device_id)
            .collect();
        tables.devices.rows.retain(|device_id, _| !devices.contains(device_id));
        tables.remove_orders(|order| devices.contains(&order.device_id));
        Ok(true)
    }
}

#[async_trait]
impl DeviceRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Device>> {
        let tables = self.tables.read().await;
        Ok(tables
            .devices
            .rows
            .keys()
            .filter_map(|id| tables.device(*id))
            .collect())
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Device>> {
        Ok(self.tables.read().await.device(id))
    }

    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<Device>> {
        let tables = self.tables.read().await;
        Ok(tables
            .devices
            .rows
            .iter()
            .filter(|(_, device)| device.client_id == client_id)
            .filter_map(|(id, _)| tables.device(*id))
            .collect())
    }

    async fn create(&self, input: &DeviceInput) -> DatabaseResult<i32> {
        let mut tables = self.tables.write().await;
        if !tables.clients.contains(input.client_id) {
            return Err(missing_reference("devices_client_id_fkey"));
        }

        Ok(tables.devices.insert(DeviceRow {
            device_type: input.device_type.clone(),
            brand: input.brand.clone(),
            model: input.model.clone(),
            serial_number: input.serial_number.clone(),
            problem_description: input.problem_description.clone(),
            client_id: input.client_id,
        }))
    }

    async fn update(&self, id: i32, input: &DeviceInput) -> DatabaseResult<Option<i32>> {
        let mut tables = self.tables.write().await;
        if !tables.devices.contains(id) {
            return Ok(None);
        }
        if !tables.clients.contains(input.client_id) {
            return Err(missing_reference("devices_client_id_fkey"));
        }

        tables.devices.rows.insert(
            id,
            DeviceRow {
                device_type: input.device_type.clone(),
                brand: input.brand.clone(),
                model: input.model.clone(),
                serial_number: input.serial_number.clone(),
                problem_description: input.problem_description.clone(),
                client_id: input.client_id,
            },
        );
        Ok(Some(id))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.devices.rows.remove(&id).is_none() {
            return Ok(false);
        }

        tables.remove_orders(|order| order.device_id == id);
        Ok(true)
    }
}

#[async_trait]
impl ServiceRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Service>> {
        Ok(self.tables.read().await.services())
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Service>> {
        Ok(self.tables.read().await.service(id))
    }

    async fn by_price_range(
        &self,
        min: &BigDecimal,
        max: &BigDecimal,
    ) -> DatabaseResult<Vec<Service>> {
        let mut services: Vec<Service> = self
            .tables
            .read()
            .await
            .services()
            .into_iter()
            .filter(|service| &service.price >= min && &service.price <= max)
            .collect();

        services.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id)));
        Ok(services)
    }

    async fn popular(&self, top: i64) -> DatabaseResult<Vec<Service>> {
        let mut services = self.tables.read().await.services();

        services.sort_by(|a, b| b.orders_count.cmp(&a.orders_count).then(a.id.cmp(&b.id)));
        services.truncate(usize::try_from(top).unwrap_or(0));
        Ok(services)
    }

    async fn create(&self, input: &ServiceInput) -> DatabaseResult<i32> {
        let mut tables = self.tables.write().await;
        Ok(tables.services.insert(ServiceRow {
            name: input.name.clone(),
            description: input.description.clone(),
            price: input.price.clone(),
        }))
    }

    async fn update(&self, id: i32, input: &ServiceInput) -> DatabaseResult<Option<i32>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.services.rows.get_mut(&id) else {
            return Ok(None);
        };

        row.name = input.name.clone();
        row.description = input.description.clone();
        row.price = input.price.clone();
        Ok(Some(id))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.services.rows.remove(&id).is_none() {
            return Ok(false);
        }

        tables.remove_orders(|order| order.service_id == id);
        Ok(true)
    }
}

#[async_trait]
impl TechnicianRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<Technician>> {
        Ok(self.tables.read().await.technicians_where(|_| true))
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<Technician>> {
        Ok(self.tables.read().await.technician(id))
    }

    async fn by_specialization(&self, text: &str) -> DatabaseResult<Vec<Technician>> {
        let needle = text.to_lowercase();
        Ok(self
            .tables
            .read()
            .await
            .technicians_where(|t| t.specialization.to_lowercase().contains(&needle)))
    }

    async fn active(&self) -> DatabaseResult<Vec<Technician>> {
        Ok(self.tables.read().await.technicians_where(|t| t.is_active))
    }

    async fn create(&self, input: &TechnicianInput) -> DatabaseResult<i32> {
        let mut tables = self.tables.write().await;
        Ok(tables.technicians.insert(TechnicianRow {
            first_name: input.first_name.clone(),
            last_name: input.last_name.clone(),
            specialization: input.specialization.clone(),
            phone: input.phone.clone(),
            is_active: input.is_active,
        }))
    }

    async fn update(&self, id: i32, input: &TechnicianInput) -> DatabaseResult<Option<i32>> {
        let mut tables = self.tables.write().await;
        let Some(row) = tables.technicians.rows.get_mut(&id) else {
            return Ok(None);
        };

        row.first_name = input.first_name.clone();
        row.last_name = input.last_name.clone();
        row.specialization = input.specialization.clone();
        row.phone = input.phone.clone();
        row.is_active = input.is_active;
        Ok(Some(id))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.technicians.rows.remove(&id).is_none() {
            return Ok(false);
        }

        tables.remove_orders(|order| order.technician_id == id);
        Ok(true)
    }
}

#[async_trait]
impl RepairOrderRepository for MemoryStore {
    async fn list(&self) -> DatabaseResult<Vec<RepairOrder>> {
        Ok(self.tables.read().await.orders_where(|_| true))
    }

    async fn get(&self, id: i32) -> DatabaseResult<Option<RepairOrder>> {
        Ok(self.tables.read().await.order(id))
    }

    async fn by_status(&self, status: OrderStatus) -> DatabaseResult<Vec<RepairOrder>> {
        Ok(self.tables.read().await.orders_where(|o| o.status == status))
    }

    async fn by_technician(&self, technician_id: i32) -> DatabaseResult<Vec<RepairOrder>> {
        Ok(self
            .tables
            .read()
            .await
            .orders_where(|o| o.technician_id == technician_id))
    }

    async fn by_client(&self, client_id: i32) -> DatabaseResult<Vec<RepairOrder>> {
        Ok(self
            .tables
            .read()
            .await
            .orders_where(|o| o.client_id == client_id))
    }

    async fn create(&self, order: &NewOrder) -> DatabaseResult<i32> {
        let mut tables = self.tables.write().await;
        tables.check_order_references(order.device_id, order.service_id, order.technician_id)?;

        Ok(tables.orders.insert(OrderRow {
            created_date: order.created_date,
            completed_date: None,
            total_cost: order.total_cost.clone(),
            status: order.status,
            device_id: order.device_id,
            service_id: order.service_id,
            technician_id: order.technician_id,
        }))
    }

    async fn update(&self, id: i32, changes: &OrderChanges) -> DatabaseResult<Option<i32>> {
        let mut tables = self.tables.write().await;
        let Some(device_id) = tables.orders.rows.get(&id).map(|o| o.device_id) else {
            return Ok(None);
        };
        tables.check_order_references(device_id, changes.service_id, changes.technician_id)?;

        if let Some(row) = tables.orders.rows.get_mut(&id) {
            row.status = changes.status;
            row.completed_date = changes.completed_date;
            row.total_cost = changes.total_cost.clone();
            row.service_id = changes.service_id;
            row.technician_id = changes.technician_id;
        }
        Ok(Some(id))
    }

    async fn delete(&self, id: i32) -> DatabaseResult<bool> {
        Ok(self.tables.write().await.orders.rows.remove(&id).is_some())
    }

    async fn statistics(&self) -> DatabaseResult<OrderStatistics> {
        let tables = self.tables.read().await;
        let mut statistics = OrderStatistics {
            total_orders: 0,
            completed_orders: 0,
            in_progress_orders: 0,
            total_revenue: BigDecimal::from(0),
        };

        for order in tables.orders.rows.values() {
            statistics.total_orders += 1;
            match order.status {
                OrderStatus::Completed => {
                    statistics.completed_orders += 1;
                    statistics.total_revenue = &statistics.total_revenue + &order.total_cost;
                }
                OrderStatus::InProgress => statistics.in_progress_orders += 1,
                _ => {}
            }
        }

        statistics.total_revenue = statistics.total_revenue.with_scale(2);
        Ok(statistics)
    }
}
