use axum::{extract::State, Extension, Json};
use ghtrend_core::RepoId;
use ghtrend_db::TrendingRow;
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

/// One ranked repository as served to clients.
#[derive(Debug, Serialize)]
pub(super) struct TrendingItem {
    id: RepoId,
    name: String,
    full_name: String,
    description: Option<String>,
    url: String,
    stars: i64,
    forks: i64,
    watchers: i64,
    /// Only present on the weekly ranking.
    #[serde(skip_serializing_if = "Option::is_none")]
    growth: Option<i64>,
}

impl From<TrendingRow> for TrendingItem {
    fn from(row: TrendingRow) -> Self {
        Self {
            id: row.repo_id,
            name: row.name,
            full_name: row.full_name,
            description: row.description,
            url: row.url,
            stars: row.stars,
            forks: row.forks,
            watchers: row.watchers,
            growth: row.growth,
        }
    }
}

pub(super) async fn daily_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<TrendingItem>>, ApiError> {
    let rows = state
        .engine
        .daily_trending()
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    Ok(Json(rows.into_iter().map(TrendingItem::from).collect()))
}

pub(super) async fn weekly_trending(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Result<Json<Vec<TrendingItem>>, ApiError> {
    let rows = state
        .engine
        .weekly_trending()
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    Ok(Json(rows.into_iter().map(TrendingItem::from).collect()))
}
