use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

use crate::errors::{AppError, AppResult};
use crate::models::{
    Area, AwardExperienceRequest, AwardExperienceResponse, CreateAreaRequest, CreateValueRequest,
    Value,
};
use crate::store::{DynStore, ValueRepository};

#[derive(Clone)]
pub struct ValueService {
    store: DynStore,
}

impl ValueService {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    pub async fn list_values(&self, user_id: Uuid) -> AppResult<Vec<Value>> {
        Ok(self.store.list_values(user_id).await?)
    }

    pub async fn create_value(&self, user_id: Uuid, request: CreateValueRequest) -> AppResult<Value> {
        request.validate()?;
        let now = Utc::now();
        let value = Value {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            description: request.description,
            color: request.color,
            icon: request.icon,
            level: 1,
            experience: 0,
            created_at: now,
            updated_at: now,
        };
        Ok(self.store.insert_value(&value).await?)
    }

    pub async fn award_experience(
        &self,
        user_id: Uuid,
        value_id: Uuid,
        request: AwardExperienceRequest,
    ) -> AppResult<AwardExperienceResponse> {
        request.validate()?;
        let mut value = self
            .store
            .get_value(user_id, value_id)
            .await?
            .ok_or(AppError::NotFound("Value"))?;

        let levels_gained = value.add_experience(request.amount);
        let value = self
            .store
            .save_value(&value)
            .await?
            .ok_or(AppError::NotFound("Value"))?;

        Ok(AwardExperienceResponse { value, levels_gained })
    }

    pub async fn list_areas(&self, user_id: Uuid) -> AppResult<Vec<Area>> {
        Ok(self.store.list_areas(user_id).await?)
    }

    pub async fn create_area(&self, user_id: Uuid, request: CreateAreaRequest) -> AppResult<Area> {
        request.validate()?;
        let area = Area {
            id: Uuid::new_v4(),
            user_id,
            name: request.name,
            color: request.color,
            icon: request.icon,
            sort_order: request.sort_order.unwrap_or(0),
            created_at: Utc::now(),
        };
        Ok(self.store.insert_area(&area).await?)
    }

    pub async fn delete_area(&self, user_id: Uuid, area_id: Uuid) -> AppResult<()> {
        if !self.store.delete_area(user_id, area_id).await? {
            return Err(AppError::NotFound("Area"));
        }
        Ok(())
    }
}
