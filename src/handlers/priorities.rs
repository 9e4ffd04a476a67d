use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::{Datelike, NaiveDate, Utc};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::priority::{
    CreatePriorityRequest, PriorityListQuery, UpdatePriorityRequest, WeeklyPriority,
};
use crate::AppState;

pub async fn list_priorities(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<PriorityListQuery>,
) -> AppResult<Json<Vec<WeeklyPriority>>> {
    let week_start = week_start_of(query.week_start.unwrap_or_else(|| Utc::now().date_naive()));

    let priorities = sqlx::query_as::<_, WeeklyPriority>(
        r#"
        SELECT * FROM weekly_priorities
        WHERE user_id = $1 AND week_start = $2
        ORDER BY position ASC, created_at ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(week_start)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(priorities))
}

pub async fn create_priority(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<CreatePriorityRequest>,
) -> AppResult<Json<WeeklyPriority>> {
    if body.content.is_empty() {
        return Err(AppError::Validation("Priority content is required".into()));
    }

    let week_start = week_start_of(body.week_start.unwrap_or_else(|| Utc::now().date_naive()));

    let position = match body.position {
        Some(position) => position,
        None => {
            sqlx::query_scalar::<_, Option<i32>>(
                "SELECT MAX(position) FROM weekly_priorities WHERE user_id = $1 AND week_start = $2",
            )
            .bind(auth_user.id)
            .bind(week_start)
            .fetch_one(&state.db)
            .await?
            .unwrap_or(0)
                + 1
        }
    };

    let priority = sqlx::query_as::<_, WeeklyPriority>(
        r#"
        INSERT INTO weekly_priorities (id, user_id, week_start, content, position)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(week_start)
    .bind(&body.content)
    .bind(position)
    .fetch_one(&state.db)
    .await?;

    Ok(Json(priority))
}

pub async fn update_priority(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(priority_id): Path<Uuid>,
    Json(body): Json<UpdatePriorityRequest>,
) -> AppResult<Json<WeeklyPriority>> {
    let existing = sqlx::query_as::<_, WeeklyPriority>(
        "SELECT * FROM weekly_priorities WHERE id = $1 AND user_id = $2",
    )
    .bind(priority_id)
    .bind(auth_user.id)
    .fetch_optional(&state.db)
    .await?
    .ok_or(AppError::NotFound("Priority not found".into()))?;

    let priority = sqlx::query_as::<_, WeeklyPriority>(
        r#"
        UPDATE weekly_priorities SET
            content = COALESCE($3, content),
            is_done = COALESCE($4, is_done),
            position = COALESCE($5, position),
            updated_at = NOW()
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(priority_id)
    .bind(auth_user.id)
    .bind(&body.content)
    .bind(body.is_done)
    .bind(body.position)
    .fetch_one(&state.db)
    .await?;

    // Completing a priority is a streak-affecting event; the recomputation
    // itself is idempotent over the entry history.
    if body.is_done == Some(true) && !existing.is_done {
        let streak =
            crate::handlers::streaks::recompute_and_store(&state, auth_user.id).await?;
        tracing::debug!(
            user_id = %auth_user.id,
            current_streak = streak.current_streak,
            "Streak recomputed after priority completion"
        );
    }

    Ok(Json(priority))
}

pub async fn delete_priority(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(priority_id): Path<Uuid>,
) -> AppResult<Json<serde_json::Value>> {
    let result = sqlx::query("DELETE FROM weekly_priorities WHERE id = $1 AND user_id = $2")
        .bind(priority_id)
        .bind(auth_user.id)
        .execute(&state.db)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Priority not found".into()));
    }

    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Monday of the ISO week containing `date`.
fn week_start_of(date: NaiveDate) -> NaiveDate {
    date - chrono::Duration::days(date.weekday().num_days_from_monday() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn week_start_is_monday() {
        // 2024-03-15 is a Friday.
        assert_eq!(week_start_of(date(2024, 3, 15)), date(2024, 3, 11));
    }

    #[test]
    fn monday_maps_to_itself() {
        assert_eq!(week_start_of(date(2024, 3, 11)), date(2024, 3, 11));
    }

    #[test]
    fn sunday_belongs_to_the_preceding_monday() {
        assert_eq!(week_start_of(date(2024, 3, 17)), date(2024, 3, 11));
    }

    #[test]
    fn week_start_crosses_month_boundaries() {
        // 2024-03-02 is a Saturday; its week starts in February.
        assert_eq!(week_start_of(date(2024, 3, 2)), date(2024, 2, 26));
    }
}
