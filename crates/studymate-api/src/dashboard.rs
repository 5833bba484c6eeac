//! Handler for `GET /dashboard`.
//!
//! Query params:
//! - `utc_offset_minutes`: the caller's UTC offset, used to decide which
//!   calendar day "today" is. Defaults to the server's local offset.

use axum::{
  Json,
  extract::State,
};
use chrono::{FixedOffset, Local, Utc};
use serde::{Deserialize, Serialize};
use studymate_core::{
  access::{assignments, subjects, tasks},
  blob::BlobStore,
  document::DocumentStore,
  schedule::{DUE_SOON_HORIZON_HOURS, DashboardStats, due_soon},
};

use crate::{
  ApiState, Authenticator, CurrentSession, assignments::AssignmentView, error::ApiError,
  extract::QueryParams,
};

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
  pub utc_offset_minutes: Option<i32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
  #[serde(flatten)]
  pub stats:    DashboardStats,
  /// Incomplete assignments due within the next day, overdue ones included.
  pub due_soon: Vec<AssignmentView>,
}

/// `GET /dashboard[?utc_offset_minutes=...]`
pub async fn handler<S, B, A>(
  State(state): State<ApiState<S, B, A>>,
  CurrentSession(session): CurrentSession,
  QueryParams(params): QueryParams<DashboardParams>,
) -> Result<Json<Dashboard>, ApiError>
where
  S: DocumentStore + 'static,
  B: BlobStore + 'static,
  A: Authenticator + 'static,
{
  let offset = match params.utc_offset_minutes {
    Some(minutes) => minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .ok_or_else(|| ApiError::BadRequest(format!("invalid utc offset: {minutes}")))?,
    None => *Local::now().offset(),
  };
  let now_utc = Utc::now();
  let now = now_utc.with_timezone(&offset);

  let store = &*state.store;
  let tasks = tasks::list_mine(store, &session).await?;
  let assignments = assignments::list_mine(store, &session).await?;
  let subject_count = subjects::list_mine(store, &session).await?.len();

  let stats = DashboardStats::compute(&tasks, &assignments, subject_count, &now);

  let soon = due_soon(&assignments, now_utc, chrono::Duration::hours(DUE_SOON_HORIZON_HOURS));
  let names = state.names.resolve(store, &session, &soon).await?;
  let due_soon = soon
    .into_iter()
    .map(|a| AssignmentView::new(a.clone(), now_utc, &names))
    .collect();

  Ok(Json(Dashboard { stats, due_soon }))
}
