use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::question::QuestionCategory;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub entry_date: NaiveDate,
    pub category: QuestionCategory,
    pub answers: Json<Vec<Answer>>,
    pub mood: Option<i32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One answered question inside an entry. The question text is snapshotted
/// at save time so later edits to the question don't rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub question_id: Uuid,
    pub question_text: String,
    pub answer_text: String,
}

#[derive(Debug, Deserialize)]
pub struct UpsertEntryRequest {
    pub entry_date: Option<NaiveDate>,
    pub category: QuestionCategory,
    pub answers: Vec<Answer>,
    pub mood: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct EntryQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<QuestionCategory>,
}
