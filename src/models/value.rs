use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

const EXPERIENCE_PER_LEVEL: i32 = 100;

/// A named personal value with gamified level/experience.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Value {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub level: i32,
    pub experience: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Value {
    /// Experience needed to leave the current level.
    pub fn experience_to_next_level(&self) -> i32 {
        self.level.max(1) * EXPERIENCE_PER_LEVEL
    }

    /// Adds experience and rolls the level over as many times as it fills.
    /// Returns the number of levels gained.
    pub fn add_experience(&mut self, amount: i32) -> i32 {
        let mut gained = 0;
        self.experience = self.experience.saturating_add(amount);
        while self.experience >= self.experience_to_next_level() {
            self.experience -= self.experience_to_next_level();
            self.level += 1;
            gained += 1;
        }
        gained
    }
}

/// Optional grouping for goals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Area {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateValueRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 1000))]
    pub description: Option<String>,
    #[validate(length(max = 20))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AwardExperienceRequest {
    #[validate(range(min = 1, max = 10000))]
    pub amount: i32,
}

#[derive(Debug, Serialize)]
pub struct AwardExperienceResponse {
    pub value: Value,
    pub levels_gained: i32,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAreaRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 20))]
    pub color: Option<String>,
    #[validate(length(max = 50))]
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(level: i32, experience: i32) -> Value {
        let now = Utc::now();
        Value {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Health".into(),
            description: None,
            color: None,
            icon: None,
            level,
            experience,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn experience_below_threshold_keeps_level() {
        let mut v = value(1, 40);
        assert_eq!(v.add_experience(50), 0);
        assert_eq!((v.level, v.experience), (1, 90));
    }

    #[test]
    fn large_award_rolls_over_several_levels() {
        // level 1 needs 100, level 2 needs 200
        let mut v = value(1, 50);
        assert_eq!(v.add_experience(300), 2);
        assert_eq!((v.level, v.experience), (3, 50));
    }
}
