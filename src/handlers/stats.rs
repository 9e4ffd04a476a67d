use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use sqlx::FromRow;

use crate::auth::middleware::AuthUser;
use crate::error::AppResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct MoodStatsQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, serde::Serialize, FromRow)]
pub struct MoodPoint {
    pub date: NaiveDate,
    pub mood: f64,
}

/// Per-day mean mood over the requested window, for the history chart.
/// Days without a mood rating are simply absent from the series.
pub async fn mood_stats(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MoodStatsQuery>,
) -> AppResult<Json<Vec<MoodPoint>>> {
    let start = query
        .start_date
        .unwrap_or_else(|| Utc::now().date_naive() - chrono::Duration::days(30));
    let end = query.end_date.unwrap_or_else(|| Utc::now().date_naive());

    let points = sqlx::query_as::<_, MoodPoint>(
        r#"
        SELECT entry_date AS date, AVG(mood)::float8 AS mood
        FROM entries
        WHERE user_id = $1 AND mood IS NOT NULL AND entry_date BETWEEN $2 AND $3
        GROUP BY entry_date
        ORDER BY entry_date ASC
        "#,
    )
    .bind(auth_user.id)
    .bind(start)
    .bind(end)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(points))
}
