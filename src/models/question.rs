use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How many active priority ("Top 5") questions a category may hold.
pub const MAX_PRIORITY_QUESTIONS: i64 = 5;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub category: QuestionCategory,
    pub is_active: bool,
    pub is_priority: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "question_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum QuestionCategory {
    Morning,
    Evening,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuestionRequest {
    pub text: String,
    pub category: QuestionCategory,
    pub is_priority: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateQuestionRequest {
    pub text: Option<String>,
    pub is_active: Option<bool>,
    pub is_priority: Option<bool>,
    pub sort_order: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionListQuery {
    pub category: Option<QuestionCategory>,
    pub include_inactive: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub category: QuestionCategory,
    pub date: Option<chrono::NaiveDate>,
}
