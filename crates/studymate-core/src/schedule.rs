//! Status and scheduling derivations.
//!
//! Everything here is a pure function of an entity snapshot and a reference
//! instant. Nothing reads the clock; callers pass `now` so results are
//! repeatable.

use std::{
  collections::{HashMap, hash_map::Entry},
  fmt::Display,
  future::Future,
};

use chrono::{DateTime, Days, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::{assignment::Assignment, task::Task};

/// Days scanned by [`compute_streak`] unless the caller asks otherwise.
pub const DEFAULT_STREAK_WINDOW_DAYS: u32 = 30;

/// Look-ahead used by [`due_soon`] on the dashboard, in hours.
pub const DUE_SOON_HORIZON_HOURS: i64 = 24;

/// Placeholder name for a subject whose lookup failed.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

// ─── Schedulable ─────────────────────────────────────────────────────────────

/// Anything with a due instant, a completion flag, and a subject.
pub trait Schedulable {
  fn due(&self) -> DateTime<Utc>;
  fn is_completed(&self) -> bool;
  fn subject_id(&self) -> &str;
}

impl Schedulable for Task {
  fn due(&self) -> DateTime<Utc> { self.date }
  fn is_completed(&self) -> bool { self.completed }
  fn subject_id(&self) -> &str { &self.subject_id }
}

impl Schedulable for Assignment {
  fn due(&self) -> DateTime<Utc> { self.due_date }
  fn is_completed(&self) -> bool { self.completed }
  fn subject_id(&self) -> &str { &self.subject_id }
}

impl<T: Schedulable + ?Sized> Schedulable for &T {
  fn due(&self) -> DateTime<Utc> { (**self).due() }
  fn is_completed(&self) -> bool { (**self).is_completed() }
  fn subject_id(&self) -> &str { (**self).subject_id() }
}

// ─── Classification ──────────────────────────────────────────────────────────

/// Display status of a task or assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
  Completed,
  Overdue,
  Pending,
}

/// Completed wins over everything; otherwise an item is overdue only once
/// `now` is strictly past its due instant.
pub fn classify<T: Schedulable + ?Sized>(item: &T, now: DateTime<Utc>) -> Status {
  if item.is_completed() {
    Status::Completed
  } else if item.due() < now {
    Status::Overdue
  } else {
    Status::Pending
  }
}

fn is_overdue<T: Schedulable + ?Sized>(item: &T, now: DateTime<Utc>) -> bool {
  !item.is_completed() && item.due() < now
}

/// List tabs shown above task and assignment lists.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
  #[default]
  All,
  Completed,
  Pending,
  Overdue,
}

/// Select the items shown under `tab`, preserving input order.
///
/// `Pending` looks at the completion flag only, so an overdue item shows up
/// under both `Pending` and `Overdue`.
pub fn filter_by_tab<T: Schedulable>(items: &[T], tab: Tab, now: DateTime<Utc>) -> Vec<&T> {
  items
    .iter()
    .filter(|item| match tab {
      Tab::All => true,
      Tab::Completed => item.is_completed(),
      Tab::Pending => !item.is_completed(),
      Tab::Overdue => is_overdue(*item, now),
    })
    .collect()
}

// ─── Streak ──────────────────────────────────────────────────────────────────

/// Count consecutive fully-completed calendar days, walking back from the
/// calendar date of `now`.
///
/// A day counts only if it has at least one task and every task on it is
/// completed. The walk stops at the first day that fails (an empty day
/// included) and covers at most `window_days` days. Dates are compared in
/// `now`'s time zone.
pub fn compute_streak<T, Tz>(tasks: &[T], now: &DateTime<Tz>, window_days: u32) -> u32
where
  T: Schedulable,
  Tz: TimeZone,
{
  let tz = now.timezone();

  // date -> (total, completed)
  let mut per_day: HashMap<NaiveDate, (usize, usize)> = HashMap::new();
  for task in tasks {
    let day = task.due().with_timezone(&tz).date_naive();
    let entry = per_day.entry(day).or_default();
    entry.0 += 1;
    if task.is_completed() {
      entry.1 += 1;
    }
  }

  let today = now.date_naive();
  let mut streak = 0;
  for offset in 0..window_days {
    let Some(day) = today.checked_sub_days(Days::new(u64::from(offset))) else {
      break;
    };
    match per_day.get(&day) {
      Some(&(total, done)) if total > 0 && total == done => streak += 1,
      _ => break,
    }
  }
  streak
}

// ─── Due soon ────────────────────────────────────────────────────────────────

/// Incomplete items due no later than `now + horizon`. Items already past
/// due are included.
pub fn due_soon<T: Schedulable>(items: &[T], now: DateTime<Utc>, horizon: Duration) -> Vec<&T> {
  let cutoff = now + horizon;
  items
    .iter()
    .filter(|item| !item.is_completed() && item.due() <= cutoff)
    .collect()
}

// ─── Subject names ───────────────────────────────────────────────────────────

/// Resolve the subject name for every distinct subject id in `items`.
///
/// `lookup` runs at most once per id, sequentially. A failed lookup maps that
/// id to [`UNKNOWN_SUBJECT`]; it never aborts the rest.
pub async fn resolve_names<T, F, Fut, E>(items: &[T], mut lookup: F) -> HashMap<String, String>
where
  T: Schedulable,
  F: FnMut(String) -> Fut,
  Fut: Future<Output = Result<String, E>>,
  E: Display,
{
  let mut names = HashMap::new();
  for item in items {
    let Entry::Vacant(slot) = names.entry(item.subject_id().to_owned()) else {
      continue;
    };
    let id = slot.key().clone();
    let name = match lookup(id.clone()).await {
      Ok(name) => name,
      Err(e) => {
        tracing::warn!(subject_id = %id, error = %e, "subject lookup failed");
        UNKNOWN_SUBJECT.to_owned()
      }
    };
    slot.insert(name);
  }
  names
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// Headline numbers for the home screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
  /// Tasks scheduled on today's calendar date.
  pub tasks_today:     usize,
  pub pending_tasks:   usize,
  /// Incomplete assignments due within the next 24 hours (or overdue).
  pub due_assignments: usize,
  pub subjects:        usize,
  pub streak:          u32,
}

impl DashboardStats {
  pub fn compute<Tz: TimeZone>(
    tasks: &[Task],
    assignments: &[Assignment],
    subjects: usize,
    now: &DateTime<Tz>,
  ) -> Self {
    let tz = now.timezone();
    let today = now.date_naive();
    let now_utc = now.with_timezone(&Utc);

    Self {
      tasks_today:     tasks
        .iter()
        .filter(|t| t.date.with_timezone(&tz).date_naive() == today)
        .count(),
      pending_tasks:   tasks.iter().filter(|t| !t.completed).count(),
      due_assignments: due_soon(
        assignments,
        now_utc,
        Duration::hours(DUE_SOON_HORIZON_HOURS),
      )
      .len(),
      subjects,
      streak:          compute_streak(tasks, now, DEFAULT_STREAK_WINDOW_DAYS),
    }
  }
}
