use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WeeklyPriority {
    pub id: Uuid,
    pub user_id: Uuid,
    pub week_start: NaiveDate,
    pub content: String,
    pub position: i32,
    pub is_done: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePriorityRequest {
    pub content: String,
    pub week_start: Option<NaiveDate>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePriorityRequest {
    pub content: Option<String>,
    pub is_done: Option<bool>,
    pub position: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct PriorityListQuery {
    pub week_start: Option<NaiveDate>,
}
