use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::{AppError, AppResult};
use crate::models::entry::{Entry, EntryQuery, UpsertEntryRequest};
use crate::AppState;

/// Save the answers for one (date, category) page. Saving twice replaces the
/// existing entry rather than creating a second one, so "at most one entry
/// per user, date, and category" holds without the client having to care.
pub async fn upsert_entry(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(body): Json<UpsertEntryRequest>,
) -> AppResult<Json<Entry>> {
    let entry_date = body.entry_date.unwrap_or_else(|| Utc::now().date_naive());

    let today = Utc::now().date_naive();
    if entry_date > today {
        return Err(AppError::Validation(
            "entry_date cannot be in the future".into(),
        ));
    }

    if let Some(mood) = body.mood {
        if !(1..=5).contains(&mood) {
            return Err(AppError::Validation("Mood must be between 1 and 5".into()));
        }
    }

    let entry = sqlx::query_as::<_, Entry>(
        r#"
        INSERT INTO entries (id, user_id, entry_date, category, answers, mood)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (user_id, entry_date, category) DO UPDATE SET
            answers = EXCLUDED.answers,
            mood = COALESCE(EXCLUDED.mood, entries.mood),
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(auth_user.id)
    .bind(entry_date)
    .bind(body.category)
    .bind(sqlx::types::Json(&body.answers))
    .bind(body.mood)
    .fetch_one(&state.db)
    .await?;

    // Entry saves are streak-affecting events.
    let streak = crate::handlers::streaks::recompute_and_store(&state, auth_user.id).await?;
    tracing::debug!(
        user_id = %auth_user.id,
        current_streak = streak.current_streak,
        "Streak recomputed after entry save"
    );

    Ok(Json(entry))
}

pub async fn list_entries(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<EntryQuery>,
) -> AppResult<Json<Vec<Entry>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let entries = if let Some(category) = query.category {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT * FROM entries
            WHERE user_id = $1 AND category = $2 AND entry_date BETWEEN $3 AND $4
            ORDER BY entry_date DESC
            "#,
        )
        .bind(auth_user.id)
        .bind(category)
        .bind(start)
        .bind(end)
        .fetch_all(&state.db)
        .await?
    } else {
        sqlx::query_as::<_, Entry>(
            r#"
            SELECT * FROM entries
            WHERE user_id = $1 AND entry_date BETWEEN $2 AND $3
            ORDER BY entry_date DESC
            "#,
        )
        .bind(auth_user.id)
        .bind(start)
        .bind(end)
        .fetch_all(&state.db)
        .await?
    };

    Ok(Json(entries))
}
