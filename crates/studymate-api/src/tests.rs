//! Route-level tests against an in-memory store.

use std::{
  convert::Infallible,
  sync::{Arc, Mutex},
};

use axum::{
  Router,
  body::Body,
  http::{HeaderMap, Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use serde_json::{Value, json};
use studymate_core::{
  blob::BlobStore,
  memory::MemoryStore,
  session::{Principal, Session},
  timestamp,
};
use tower::ServiceExt as _;

use super::*;

/// Trusts an `x-user` header. Good enough to drive the routes.
struct HeaderAuth;

impl Authenticator for HeaderAuth {
  async fn authenticate(&self, headers: &HeaderMap) -> Session {
    let Some(user) = headers.get("x-user").and_then(|v| v.to_str().ok()) else {
      return Session::Anonymous;
    };
    Session::Authenticated(Principal {
      id:           user.to_owned(),
      display_name: Some(format!("{user} (display)")),
      email:        Some(format!("{user}@example.com")),
      photo_url:    None,
    })
  }
}

#[derive(Default)]
struct FakeBlobs {
  uploads: Mutex<Vec<String>>,
}

impl BlobStore for FakeBlobs {
  type Error = Infallible;

  async fn upload(&self, _bytes: Vec<u8>, content_type: &str) -> Result<String, Infallible> {
    let mut uploads = self.uploads.lock().unwrap();
    uploads.push(content_type.to_owned());
    Ok(format!("http://cdn.test/{}.img", uploads.len()))
  }
}

struct Harness {
  app:   Router,
  store: MemoryStore,
  blobs: Arc<FakeBlobs>,
}

fn harness() -> Harness {
  let store = MemoryStore::new();
  let blobs = Arc::new(FakeBlobs::default());
  let state = ApiState::new(Arc::new(store.clone()), blobs.clone(), Arc::new(HeaderAuth));
  Harness { app: api_router(state), store, blobs }
}

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  user: Option<&str>,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  if let Some(user) = user {
    builder = builder.header("x-user", user);
  }
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };

  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, value)
}

async fn create_subject(app: &Router, user: &str, name: &str) -> String {
  let (status, body) =
    send(app, "POST", "/subjects", Some(user), Some(json!({ "name": name }))).await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_str().unwrap().to_owned()
}

async fn create_task(app: &Router, user: &str, subject_id: &str, days_from_now: i64) -> String {
  let date = timestamp::encode(Utc::now() + Duration::days(days_from_now));
  let (status, body) = send(
    app,
    "POST",
    "/tasks",
    Some(user),
    Some(json!({ "title": "Revise", "subjectId": subject_id, "date": date })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED, "{body}");
  body["id"].as_str().unwrap().to_owned()
}

// ── Authentication ───────────────────────────────────────────────────────────

#[tokio::test]
async fn anonymous_requests_get_401_without_touching_the_store() {
  let h = harness();
  let req = Request::builder().uri("/subjects").body(Body::empty()).unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();

  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  assert_eq!(h.store.calls(), 0);
}

#[tokio::test]
async fn first_request_creates_the_profile() {
  let h = harness();
  let (status, body) = send(&h.app, "GET", "/profile", Some("alice"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["name"], "alice (display)");
  assert_eq!(body["email"], "alice@example.com");

  let (_, renamed) =
    send(&h.app, "PATCH", "/profile", Some("alice"), Some(json!({ "name": "Alice" }))).await;
  assert_eq!(renamed["name"], "Alice");

  // A later request must not recreate the profile over the rename.
  let (_, again) = send(&h.app, "GET", "/profile", Some("alice"), None).await;
  assert_eq!(again["name"], "Alice");
}

// ── Subjects ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn subjects_list_with_task_counts() {
  let h = harness();
  let maths = create_subject(&h.app, "alice", "Maths").await;
  create_subject(&h.app, "alice", "History").await;
  create_task(&h.app, "alice", &maths, 1).await;
  create_task(&h.app, "alice", &maths, 2).await;

  let (status, body) =
    send(&h.app, "GET", "/subjects?with_task_count=true", Some("alice"), None).await;
  assert_eq!(status, StatusCode::OK);
  let counts: Vec<(String, u64)> = body
    .as_array()
    .unwrap()
    .iter()
    .map(|s| (s["name"].as_str().unwrap().to_owned(), s["taskCount"].as_u64().unwrap()))
    .collect();
  assert!(counts.contains(&("Maths".into(), 2)));
  assert!(counts.contains(&("History".into(), 0)));

  let (_, plain) = send(&h.app, "GET", "/subjects", Some("alice"), None).await;
  assert!(plain[0].get("taskCount").is_none());
}

#[tokio::test]
async fn deleting_a_subject_with_tasks_conflicts() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Maths").await;
  let task = create_task(&h.app, "alice", &subject, 1).await;

  let (status, body) =
    send(&h.app, "DELETE", &format!("/subjects/{subject}"), Some("alice"), None).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert!(body["error"].as_str().unwrap().contains(&subject));

  let (status, _) = send(&h.app, "DELETE", &format!("/tasks/{task}"), Some("alice"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) =
    send(&h.app, "DELETE", &format!("/subjects/{subject}"), Some("alice"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, _) = send(&h.app, "GET", &format!("/subjects/{subject}"), Some("alice"), None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn blank_subject_name_is_a_bad_request() {
  let h = harness();
  let (status, _) =
    send(&h.app, "POST", "/subjects", Some("alice"), Some(json!({ "name": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Tasks ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn task_list_carries_status_and_subject_name() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Chemistry").await;
  create_task(&h.app, "alice", &subject, 3).await;
  create_task(&h.app, "alice", &subject, -3).await;

  let (status, body) = send(&h.app, "GET", "/tasks", Some("alice"), None).await;
  assert_eq!(status, StatusCode::OK);
  let items = body.as_array().unwrap();
  assert_eq!(items.len(), 2);
  // Earliest date first.
  assert_eq!(items[0]["status"], "overdue");
  assert_eq!(items[1]["status"], "pending");
  assert!(items.iter().all(|t| t["subjectName"] == "Chemistry"));
}

#[tokio::test]
async fn task_tabs_filter_the_list() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Physics").await;
  let done = create_task(&h.app, "alice", &subject, -1).await;
  create_task(&h.app, "alice", &subject, -2).await;
  create_task(&h.app, "alice", &subject, 2).await;

  let (status, body) = send(
    &h.app,
    "POST",
    &format!("/tasks/{done}/completed"),
    Some("alice"),
    Some(json!({ "completed": true })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["status"], "completed");

  let count = |body: Value| body.as_array().unwrap().len();
  let (_, all) = send(&h.app, "GET", "/tasks?tab=all", Some("alice"), None).await;
  let (_, completed) = send(&h.app, "GET", "/tasks?tab=completed", Some("alice"), None).await;
  let (_, pending) = send(&h.app, "GET", "/tasks?tab=pending", Some("alice"), None).await;
  let (_, overdue) = send(&h.app, "GET", "/tasks?tab=overdue", Some("alice"), None).await;
  assert_eq!(count(all), 3);
  assert_eq!(count(completed), 1);
  // Overdue incomplete tasks also show under "pending".
  assert_eq!(count(pending), 2);
  assert_eq!(count(overdue), 1);

  let (_, open) = send(&h.app, "GET", "/tasks?completed=false", Some("alice"), None).await;
  assert_eq!(count(open), 2);
}

#[tokio::test]
async fn another_principals_task_is_forbidden() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Art").await;
  let task = create_task(&h.app, "alice", &subject, 1).await;

  let uri = format!("/tasks/{task}");
  let (status, _) = send(&h.app, "GET", &uri, Some("bob"), None).await;
  assert_eq!(status, StatusCode::FORBIDDEN);
  let (status, _) =
    send(&h.app, "PATCH", &uri, Some("bob"), Some(json!({ "title": "Mine now" }))).await;
  assert_eq!(status, StatusCode::FORBIDDEN);

  let (_, bobs) = send(&h.app, "GET", "/tasks", Some("bob"), None).await;
  assert!(bobs.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn renaming_a_subject_refreshes_task_views() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Bio").await;
  let task = create_task(&h.app, "alice", &subject, 1).await;

  let (_, before) = send(&h.app, "GET", &format!("/tasks/{task}"), Some("alice"), None).await;
  assert_eq!(before["subjectName"], "Bio");

  let (status, renamed) = send(
    &h.app,
    "PATCH",
    &format!("/subjects/{subject}"),
    Some("alice"),
    Some(json!({ "name": "Biology" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(renamed["name"], "Biology");

  let (_, after) = send(&h.app, "GET", "/tasks", Some("alice"), None).await;
  assert_eq!(after[0]["subjectName"], "Biology");
}

#[tokio::test]
async fn task_with_missing_subject_reads_unknown() {
  let h = harness();
  create_task(&h.app, "alice", "no-such-subject", 1).await;
  let (_, body) = send(&h.app, "GET", "/tasks", Some("alice"), None).await;
  assert_eq!(body[0]["subjectName"], "Unknown");
}

// ── Assignments ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn assignments_filter_by_subject_and_complete() {
  let h = harness();
  let maths = create_subject(&h.app, "alice", "Maths").await;
  let art = create_subject(&h.app, "alice", "Art").await;
  let due = timestamp::encode(Utc::now() + Duration::days(5));

  let (status, created) = send(
    &h.app,
    "POST",
    "/assignments",
    Some("alice"),
    Some(json!({ "title": "Essay", "dueDate": due, "subjectId": maths })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = created["id"].as_str().unwrap().to_owned();
  send(
    &h.app,
    "POST",
    "/assignments",
    Some("alice"),
    Some(json!({ "title": "Portrait", "dueDate": due, "subjectId": art })),
  )
  .await;

  let (_, maths_only) =
    send(&h.app, "GET", &format!("/assignments?subject_id={maths}"), Some("alice"), None).await;
  let maths_only = maths_only.as_array().unwrap();
  assert_eq!(maths_only.len(), 1);
  assert_eq!(maths_only[0]["title"], "Essay");
  assert_eq!(maths_only[0]["subjectName"], "Maths");
  assert_eq!(maths_only[0]["completed"], false);

  let (_, done) = send(
    &h.app,
    "POST",
    &format!("/assignments/{id}/completed"),
    Some("alice"),
    Some(json!({ "completed": true })),
  )
  .await;
  assert_eq!(done["status"], "completed");

  let (_, completed) =
    send(&h.app, "GET", "/assignments?tab=completed", Some("alice"), None).await;
  assert_eq!(completed.as_array().unwrap().len(), 1);
}

// ── Profile avatar ───────────────────────────────────────────────────────────

#[tokio::test]
async fn avatar_upload_sets_photo_url() {
  let h = harness();
  let req = Request::builder()
    .method("PUT")
    .uri("/profile/avatar")
    .header("x-user", "alice")
    .header(header::CONTENT_TYPE, "image/png")
    .body(Body::from(vec![0x89, b'P', b'N', b'G']))
    .unwrap();
  let resp = h.app.clone().oneshot(req).await.unwrap();
  assert_eq!(resp.status(), StatusCode::OK);

  let (_, profile) = send(&h.app, "GET", "/profile", Some("alice"), None).await;
  assert_eq!(profile["photoUrl"], "http://cdn.test/1.img");
  assert_eq!(h.blobs.uploads.lock().unwrap().as_slice(), ["image/png"]);
}

#[tokio::test]
async fn avatar_upload_requires_an_image_content_type() {
  let h = harness();
  let missing = Request::builder()
    .method("PUT")
    .uri("/profile/avatar")
    .header("x-user", "alice")
    .body(Body::from(vec![1, 2, 3]))
    .unwrap();
  assert_eq!(h.app.clone().oneshot(missing).await.unwrap().status(), StatusCode::BAD_REQUEST);

  let text = Request::builder()
    .method("PUT")
    .uri("/profile/avatar")
    .header("x-user", "alice")
    .header(header::CONTENT_TYPE, "text/plain")
    .body(Body::from("hello"))
    .unwrap();
  assert_eq!(h.app.clone().oneshot(text).await.unwrap().status(), StatusCode::BAD_REQUEST);
  assert!(h.blobs.uploads.lock().unwrap().is_empty());
}

// ── Dashboard ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_summarises_the_callers_data() {
  let h = harness();
  let subject = create_subject(&h.app, "alice", "Maths").await;
  create_task(&h.app, "alice", &subject, 4).await;
  let soon = timestamp::encode(Utc::now() + Duration::hours(3));
  let later = timestamp::encode(Utc::now() + Duration::days(7));
  for due in [soon, later] {
    send(
      &h.app,
      "POST",
      "/assignments",
      Some("alice"),
      Some(json!({ "title": "Worksheet", "dueDate": due, "subjectId": subject })),
    )
    .await;
  }

  let (status, body) =
    send(&h.app, "GET", "/dashboard?utc_offset_minutes=0", Some("alice"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["pendingTasks"], 1);
  assert_eq!(body["dueAssignments"], 1);
  assert_eq!(body["subjects"], 1);
  assert_eq!(body["streak"], 0);
  assert_eq!(body["dueSoon"].as_array().unwrap().len(), 1);
  assert_eq!(body["dueSoon"][0]["subjectName"], "Maths");
}

#[tokio::test]
async fn dashboard_rejects_an_impossible_offset() {
  let h = harness();
  let (status, _) =
    send(&h.app, "GET", "/dashboard?utc_offset_minutes=100000", Some("alice"), None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ── Malformed input ──────────────────────────────────────────────────────────

async fn error_body(resp: axum::response::Response) -> (StatusCode, Value) {
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn unparseable_json_gets_a_json_error() {
  let h = harness();
  let req = Request::builder()
    .method("POST")
    .uri("/subjects")
    .header("x-user", "alice")
    .header(header::CONTENT_TYPE, "application/json")
    .body(Body::from("{\"name\": "))
    .unwrap();
  let (status, body) = error_body(h.app.clone().oneshot(req).await.unwrap()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");

  let (_, subjects) = send(&h.app, "GET", "/subjects", Some("alice"), None).await;
  assert_eq!(subjects, json!([]));
}

#[tokio::test]
async fn wrong_json_shape_gets_a_json_error() {
  let h = harness();
  let (status, body) =
    send(&h.app, "POST", "/subjects", Some("alice"), Some(json!({ "name": 7 }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string(), "{body}");
}

#[tokio::test]
async fn unparseable_query_gets_a_json_error() {
  let h = harness();
  let req = Request::builder()
    .method("GET")
    .uri("/dashboard?utc_offset_minutes=abc")
    .header("x-user", "alice")
    .body(Body::empty())
    .unwrap();
  let (status, body) = error_body(h.app.clone().oneshot(req).await.unwrap()).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string(), "{body}");
}
