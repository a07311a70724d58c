use axum::{
    extract::{Path, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use ghtrend_core::RepoId;
use ghtrend_db::{RepositoryDetail, SnapshotRow};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, AppState};

#[derive(Debug, Serialize)]
pub(super) struct RepositoryDetailItem {
    id: RepoId,
    name: String,
    full_name: String,
    description: Option<String>,
    url: String,
    stars: i64,
    forks: i64,
    watchers: i64,
    history: Vec<HistoryPoint>,
}

#[derive(Debug, Serialize)]
pub(super) struct HistoryPoint {
    stars: i64,
    forks: i64,
    watchers: i64,
    date: DateTime<Utc>,
}

impl From<SnapshotRow> for HistoryPoint {
    fn from(row: SnapshotRow) -> Self {
        Self {
            stars: row.stars,
            forks: row.forks,
            watchers: row.watchers,
            date: row.collected_at,
        }
    }
}

impl From<RepositoryDetail> for RepositoryDetailItem {
    fn from(detail: RepositoryDetail) -> Self {
        let RepositoryDetail {
            repository,
            latest,
            history,
        } = detail;
        Self {
            id: repository.repo_id,
            name: repository.name,
            full_name: repository.full_name,
            description: repository.description,
            url: repository.url,
            stars: latest.stars,
            forks: latest.forks,
            watchers: latest.watchers,
            history: history.into_iter().map(HistoryPoint::from).collect(),
        }
    }
}

pub(super) async fn get_repository(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<String>,
) -> Result<Json<RepositoryDetailItem>, ApiError> {
    let repo_id: RepoId = id.parse().map_err(|_| {
        ApiError::new(
            req_id.0.clone(),
            "validation_error",
            format!("repository id must be an integer, got \"{id}\""),
        )
    })?;

    let detail = state
        .engine
        .repository_detail(repo_id)
        .await
        .map_err(|e| map_db_error(req_id.0, &e))?;

    Ok(Json(detail.into()))
}
