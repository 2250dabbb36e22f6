//! Technician roster

use common::{ApiError, ApiResult};
use std::sync::Arc;
use tracing::info;

use crate::{
    models::{RepairOrder, Technician, TechnicianInput},
    repositories::{RepairOrderRepository, Repositories, TechnicianRepository},
};

#[derive(Clone)]
pub struct Technicians {
    technicians: Arc<dyn TechnicianRepository>,
    orders: Arc<dyn RepairOrderRepository>,
}

impl Technicians {
    pub fn new(repositories: &Repositories) -> Self {
        Self {
            technicians: repositories.technicians.clone(),
            orders: repositories.orders.clone(),
        }
    }

    pub async fn list(&self) -> ApiResult<Vec<Technician>> {
        Ok(self.technicians.list().await?)
    }

    pub async fn get(&self, id: i32) -> ApiResult<Technician> {
        self.technicians
            .get(id)
            .await?
            .ok_or_else(|| ApiError::not_found("Technician", id))
    }

    pub async fn create(&self, input: TechnicianInput) -> ApiResult<Technician> {
        input.validate().map_err(ApiError::Validation)?;

        let id = self.technicians.create(&input).await?;
        info!("Technician {} hired", id);
        self.get(id).await
    }

    pub async fn update(&self, id: i32, input: TechnicianInput) -> ApiResult<Technician> {
        input.validate().map_err(ApiError::Validation)?;

        self.technicians
            .update(id, &input)
            .await?
            .ok_or_else(|| ApiError::not_found("Technician", id))?;
        self.get(id).await
    }

    /// Removes the technician and every order assigned to them
    pub async fn delete(&self, id: i32) -> ApiResult<bool> {
        Ok(self.technicians.delete(id).await?)
    }

    pub async fn by_specialization(&self, text: &str) -> ApiResult<Vec<Technician>> {
        Ok(self.technicians.by_specialization(text.trim()).await?)
    }

    pub async fn active(&self) -> ApiResult<Vec<Technician>> {
        Ok(self.technicians.active().await?)
    }

    pub async fn orders(&self, technician_id: i32) -> ApiResult<Vec<RepairOrder>> {
        self.get(technician_id).await?;
        Ok(self.orders.by_technician(technician_id).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(first_name: &str, specialization: &str, is_active: bool) -> TechnicianInput {
        TechnicianInput {
            first_name: first_name.to_string(),
            last_name: "Smirnova".to_string(),
            specialization: specialization.to_string(),
            phone: String::new(),
            is_active,
        }
    }

    #[tokio::test]
    async fn test_specialization_and_active() {
        let technicians = Technicians::new(&Repositories::in_memory());
        technicians
            .create(input("Anna", "Phone repair", true))
            .await
            .unwrap();
        technicians
            .create(input("Boris", "Laptops", false))
            .await
            .unwrap();

        let phones = technicians.by_specialization(" PHONE ").await.unwrap();
        assert_eq!(phones.len(), 1);
        assert_eq!(phones[0].first_name, "Anna");

        let active = technicians.active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert!(active[0].is_active);
    }

    #[tokio::test]
    async fn test_orders_for_unknown_technician() {
        let technicians = Technicians::new(&Repositories::in_memory());
        assert!(matches!(
            technicians.orders(5).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let technicians = Technicians::new(&Repositories::in_memory());
        let technician = technicians
            .create(input("Anna", "Phones", true))
            .await
            .unwrap();

        let updated = technicians
            .update(technician.id, input("Anna", "Tablets", false))
            .await
            .unwrap();
        assert_eq!(updated.specialization, "Tablets");
        assert!(!updated.is_active);

        assert!(matches!(
            technicians.update(99, input("Anna", "Phones", true)).await,
            Err(ApiError::NotFound(_))
        ));

        assert!(technicians.delete(technician.id).await.unwrap());
        assert!(matches!(
            technicians.get(technician.id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
