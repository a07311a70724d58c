use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use ghtrend_db::CollectionRunRow;
use serde::{Deserialize, Serialize};

use crate::middleware::RequestId;

use super::{map_db_error, normalize_limit, ApiError, AppState};

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub(super) struct CollectionRunsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Serialize)]
pub(super) struct CollectionRunItem {
    id: i64,
    trigger_source: String,
    status: String,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    repositories_processed: i32,
    error_message: Option<String>,
}

impl From<CollectionRunRow> for CollectionRunItem {
    fn from(row: CollectionRunRow) -> Self {
        Self {
            id: row.id,
            trigger_source: row.trigger_source,
            status: row.status,
            started_at: row.started_at,
            completed_at: row.completed_at,
            repositories_processed: row.repositories_processed,
            error_message: row.error_message,
        }
    }
}

pub(super) async fn list_collection_runs(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CollectionRunsQuery>,
) -> Result<Json<Vec<CollectionRunItem>>, ApiError> {
    let rows = state
        .store
        .list_collection_runs(normalize_limit(query.limit, DEFAULT_LIMIT))
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    Ok(Json(rows.into_iter().map(CollectionRunItem::from).collect()))
}
