use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::error::ServiceError;
use crate::state::AppState;

use super::dto::{LogDetail, LogGridQuery, LogGridResponse, LogRead, SortColumn, SortDir};

pub fn read_router() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_logs))
        .route("/logs/query", get(query_logs))
        .route("/logs/:id", get(get_log))
}

#[instrument(skip(state))]
async fn list_logs(State(state): State<AppState>) -> Result<Json<Vec<LogRead>>, ServiceError> {
    let logs = state.logs.get_all().await?;
    Ok(Json(logs))
}

/// Server-side grid over the log list: equality filters, then sort, then
/// the paging window. Counts are reported before and after filtering.
#[instrument(skip(state))]
async fn query_logs(
    State(state): State<AppState>,
    Query(query): Query<LogGridQuery>,
) -> Result<Json<LogGridResponse>, ServiceError> {
    let rows = state.logs.get_all().await?;
    Ok(Json(apply_grid(rows, &query)))
}

#[instrument(skip(state))]
async fn get_log(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<LogDetail>, ServiceError> {
    let log = state.logs.get_log(id).await?;
    Ok(Json(LogDetail {
        id: log.id,
        entity_ref: log.entity_ref,
        entity_type: log.entity_type,
        action_type: log.action_type,
        details: log.details,
        from: log.from.as_deref().map(prettify),
        to: log.to.as_deref().map(prettify),
        by: log.by,
        at: log.at,
    }))
}

fn apply_grid(rows: Vec<LogRead>, query: &LogGridQuery) -> LogGridResponse {
    let records_total = rows.len();

    let mut rows: Vec<LogRead> = rows
        .into_iter()
        .filter(|l| query.action_type.map_or(true, |a| l.action_type == a))
        .filter(|l| query.entity_type.map_or(true, |e| l.entity_type == e))
        .collect();
    let records_filtered = rows.len();

    rows.sort_by(|a, b| {
        let ord = match query.sort {
            SortColumn::Id => a.id.cmp(&b.id),
            SortColumn::EntityRef => a.entity_ref.cmp(&b.entity_ref),
            SortColumn::EntityType => (a.entity_type as i16).cmp(&(b.entity_type as i16)),
            SortColumn::ActionType => (a.action_type as i16).cmp(&(b.action_type as i16)),
            SortColumn::By => a.by.cmp(&b.by),
            SortColumn::At => a.at.cmp(&b.at),
        };
        match query.dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });

    let data = rows.into_iter().skip(query.start).take(query.length).collect();
    LogGridResponse {
        records_total,
        records_filtered,
        data,
    }
}

/// Pretty-print a stored snapshot for the detail view. Anything that does
/// not parse as JSON is passed through untouched.
fn prettify(raw: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}
