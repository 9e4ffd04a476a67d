use axum::{extract::State, Extension, Json};
use chrono::NaiveDate;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::services::streak::{compute_streak, StreakState};
use crate::AppState;

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakState>> {
    let (current_streak, best_streak, last_active_date) =
        sqlx::query_as::<_, (i32, i32, Option<NaiveDate>)>(
            "SELECT current_streak, best_streak, last_active_date FROM users WHERE id = $1",
        )
        .bind(auth_user.id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(StreakState {
        current_streak,
        best_streak,
        last_active_date,
    }))
}

/// Recompute from full entry history and persist. Idempotent: calling this
/// with nothing changed returns the same state it stored last time.
pub async fn recompute_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakState>> {
    let streak = recompute_and_store(&state, auth_user.id).await?;
    Ok(Json(streak))
}

/// Recompute the user's streak state from their full entry history and
/// replace the persisted values. Takes the user's save gate first, so only
/// one recompute-and-write is in flight per user at a time.
pub async fn recompute_and_store(state: &AppState, user_id: Uuid) -> AppResult<StreakState> {
    let _gate = state.save_locks.acquire(user_id).await;

    let dates = sqlx::query_scalar::<_, NaiveDate>(
        "SELECT DISTINCT entry_date FROM entries WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_all(&state.db)
    .await?;

    let previous_best =
        sqlx::query_scalar::<_, i32>("SELECT best_streak FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?
            .ok_or(AppError::NotFound("User not found".into()))?;

    let streak = compute_streak(&dates, previous_best);

    // GREATEST keeps best-streak monotonic even if an older value lands late.
    sqlx::query(
        r#"
        UPDATE users SET
            current_streak = $2,
            best_streak = GREATEST(best_streak, $3),
            last_active_date = $4,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(streak.current_streak)
    .bind(streak.best_streak)
    .bind(streak.last_active_date)
    .execute(&state.db)
    .await?;

    Ok(streak)
}
