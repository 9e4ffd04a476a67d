use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::question::{
    CreateQuestionRequest, Question, QuestionListQuery, TodayQuery, UpdateQuestionRequest,
    MAX_PRIORITY_QUESTIONS,
};
use crate::services::rotation::select_todays_questions;
use crate::AppState;

pub async fn list_questions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<QuestionListQuery>,
) -> AppResult<Json<Vec<Question>>> {
    let include_inactive = query.include_inactive.unwrap_or(false);

    let questions = if let Some(category) = query.category {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE user_id = $1 AND category = $2 AND (is_active = true OR $3)
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(auth_user.id)
        .bind(category)
        .bind(include_inactive)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, Question>(
            r#"
            SELECT * FROM questions
            WHERE user_id = $1 AND (is_active = true OR $2)
            ORDER BY sort_order ASC, created_at ASC
            "#,
        )
        .bind(auth_user.id)
        .bind(include_inactive)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(questions))
}

/// The question set to present for a given date: priority questions plus the
/// date-keyed rotating pick for mornings, everything active for evenings.
/// Reload-stable — the same date always yields the same list.
pub async fn todays_questions(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<TodayQuery>,
) -> AppResult<Json<Vec<Question>>> {
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());

    let questions = sqlx::query_as::<_, Question>(
        r#"
        SELECT * FROM questions
        WHERE user_id = $1 AND category = $2
        ORDER BY sort_order ASC, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(query.category)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(select_todays_questions(
        &questions,
        query.category,
        date,
    )))
}

pub async fn get_question(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
) -> AppResult<Json<Question>> {
    let question = sqlx::query_as::<_, Question>(
        "SELECT * FROM questions WHERE id = $1 AND user_id = $2",
    )
    .bind(question_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Question not found".into()))?;

    Ok(Json(question))
}

pub async fn create_question(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreateQuestionRequest>,
) -> AppResult<Json<Question>> {
    if body.text.is_empty() {
        return Err(AppError::Validation("Question text is required".into()));
    }

    let is_priority = body.is_priority.unwrap_or(false);
    if is_priority {
        ensure_priority_capacity(&state, auth_user.id, body.category, None).await?;
    }

    let sort_order = match body.sort_order {
        Some(order) => order,
        None => {
            sqlx::query_scalar::<_, Option<i32>>(
                "SELECT MAX(sort_order) FROM questions WHERE user_id = $1 AND category = $2",
            )
            .bind(auth_user.id)
            .bind(body.category)
            .fetch_one(&state.db)
            .await?
            .unwrap_or(0)
                + 1
        }
    };

    let question = sqlx::query_as::<_, Question>(
        r#"
        INSERT INTO questions (id, user_id, text, category, is_priority, sort_order)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(&body.text)
    .bind(body.category)
    .bind(is_priority)
    .bind(sort_order)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(question))
}

pub async fn update_question(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
    Json(body): Json<UpdateQuestionRequest>,
) -> AppResult<Json<Question>> {
    let existing = sqlx::query_as::<_, Question>(
        "SELECT * FROM questions WHERE id = $1 AND user_id = $2",
    )
    .bind(question_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Question not found".into()))?;

    if let Some(text) = &body.text {
        if text.is_empty() {
            return Err(AppError::Validation("Question text is required".into()));
        }
    }

    if body.is_priority == Some(true) && !existing.is_priority {
        ensure_priority_capacity(&state, auth_user.id, existing.category, Some(question_id))
            .await?;
    }

    let question = sqlx::query_as::<_, Question>(
        r#"
        UPDATE questions SET
            text = COALESCE($3, text),
            is_active = COALESCE($4, is_active),
            is_priority = COALESCE($5, is_priority),
            sort_order = COALESCE($6, sort_order),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(question_id)
    .bind(auth_user.id)
    .bind(&body.text)
    .bind(body.is_active)
    .bind(body.is_priority)
    .bind(body.sort_order)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(question))
}

pub async fn delete_question(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(question_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM questions WHERE id = $1 AND user_id = $2")
        .bind(question_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Question not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Enforce the "Top 5" cap: a category holds at most
/// [`MAX_PRIORITY_QUESTIONS`] active priority questions.
async fn ensure_priority_capacity(
    state: &AppState,
    user_id: Uuid,
    category: crate::models::question::QuestionCategory,
    exclude_id: Option<Uuid>,
) -> AppResult<()> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM questions
        WHERE user_id = $1 AND category = $2 AND is_priority = true AND is_active = true
          AND ($3::uuid IS NULL OR id <> $3)
        "#,
    )
    .bind(user_id)
    .bind(category)
    .bind(exclude_id)
    .fetch_one(&state.db)
    .await?;

    if count >= MAX_PRIORITY_QUESTIONS {
        return Err(AppError::Validation(format!(
            "At most {} priority questions per category",
            MAX_PRIORITY_QUESTIONS
        )));
    }

    Ok(())
}
