//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use serde_json::{Value, json};
use studymate_core::{
  Error as CoreError,
  access::{assignments, profiles, subjects, tasks},
  assignment::NewAssignment,
  document::{Collection, Direction, DocumentStore, Fields, Query},
  profile::ProfilePatch,
  session::{Principal, Session},
  subject::{NewSubject, SubjectPatch},
  task::{NewTask, Priority},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn obj(value: Value) -> Fields {
  value.as_object().cloned().expect("object literal")
}

// ─── Raw documents ───────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_document() {
  let s = store().await;
  let id = s
    .create(Collection::Subjects, obj(json!({ "name": "Maths", "ownerId": "u1" })))
    .await
    .unwrap();

  let doc = s.get(Collection::Subjects, &id).await.unwrap().unwrap();
  assert_eq!(doc.id, id);
  assert_eq!(doc.fields["name"], "Maths");
  assert_eq!(doc.owner_id(), Some("u1"));

  // Same id in another collection is a different document.
  assert!(s.get(Collection::Tasks, &id).await.unwrap().is_none());
}

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(s.get(Collection::Tasks, "nope").await.unwrap().is_none());
}

#[tokio::test]
async fn query_filters_on_strings_and_booleans() {
  let s = store().await;
  for (owner, completed) in [("u1", true), ("u1", false), ("u2", false)] {
    s.create(
      Collection::Tasks,
      obj(json!({ "ownerId": owner, "completed": completed })),
    )
    .await
    .unwrap();
  }

  let open = Query::owned_by("u1").filter("completed", false);
  let docs = s.query(Collection::Tasks, &open).await.unwrap();
  assert_eq!(docs.len(), 1);
  assert_eq!(docs[0].fields["completed"], false);

  let all_u1 = s.query(Collection::Tasks, &Query::owned_by("u1")).await.unwrap();
  assert_eq!(all_u1.len(), 2);
}

#[tokio::test]
async fn query_orders_by_field() {
  let s = store().await;
  for date in ["2024-03-02T00:00:00.000Z", "2024-03-03T00:00:00.000Z", "2024-03-01T00:00:00.000Z"] {
    s.create(Collection::Tasks, obj(json!({ "ownerId": "u1", "date": date })))
      .await
      .unwrap();
  }

  let q = Query::owned_by("u1").order_by("date", Direction::Descending);
  let docs = s.query(Collection::Tasks, &q).await.unwrap();
  let dates: Vec<_> = docs.iter().map(|d| d.fields["date"].as_str().unwrap()).collect();
  assert_eq!(dates, [
    "2024-03-03T00:00:00.000Z",
    "2024-03-02T00:00:00.000Z",
    "2024-03-01T00:00:00.000Z",
  ]);
}

#[tokio::test]
async fn equal_sort_keys_keep_insertion_order_in_either_direction() {
  let s = store().await;
  let at = "2024-03-01T08:00:00.000Z";
  let mut ids = Vec::new();
  for name in ["first", "second", "third"] {
    let id = s
      .create(Collection::Subjects, obj(json!({ "ownerId": "u1", "name": name, "createdAt": at })))
      .await
      .unwrap();
    ids.push(id);
  }

  let newest = Query::owned_by("u1").order_by("createdAt", Direction::Descending);
  let docs = s.query(Collection::Subjects, &newest).await.unwrap();
  let names: Vec<_> = docs.iter().map(|d| d.fields["name"].as_str().unwrap()).collect();
  assert_eq!(names, ["third", "second", "first"]);

  let oldest = Query::owned_by("u1").order_by("createdAt", Direction::Ascending);
  let docs = s.query(Collection::Subjects, &oldest).await.unwrap();
  let got: Vec<_> = docs.iter().map(|d| d.id.clone()).collect();
  assert_eq!(got, ids);
}

#[tokio::test]
async fn update_patches_and_null_removes() {
  let s = store().await;
  let id = s
    .create(
      Collection::Subjects,
      obj(json!({ "name": "Maths", "color": "#fff", "ownerId": "u1" })),
    )
    .await
    .unwrap();

  s.update(Collection::Subjects, &id, obj(json!({ "name": "Algebra", "color": null })))
    .await
    .unwrap();

  let doc = s.get(Collection::Subjects, &id).await.unwrap().unwrap();
  assert_eq!(doc.fields["name"], "Algebra");
  assert!(!doc.fields.contains_key("color"));
  assert_eq!(doc.fields["ownerId"], "u1");
}

#[tokio::test]
async fn update_missing_document_fails() {
  let s = store().await;
  let result = s.update(Collection::Tasks, "nope", Fields::new()).await;
  assert!(matches!(result, Err(Error::DocumentNotFound { collection: Collection::Tasks, .. })));
}

#[tokio::test]
async fn put_replaces_whole_document() {
  let s = store().await;
  s.put(Collection::Profiles, "u1", obj(json!({ "name": "A", "email": "a@x" })))
    .await
    .unwrap();
  s.put(Collection::Profiles, "u1", obj(json!({ "name": "B" })))
    .await
    .unwrap();

  let doc = s.get(Collection::Profiles, "u1").await.unwrap().unwrap();
  assert_eq!(doc.fields["name"], "B");
  assert!(!doc.fields.contains_key("email"));
}

#[tokio::test]
async fn insert_leaves_an_existing_document_alone() {
  let s = store().await;
  assert!(s.insert(Collection::Profiles, "u1", obj(json!({ "name": "A" }))).await.unwrap());
  s.update(Collection::Profiles, "u1", obj(json!({ "name": "Edited" })))
    .await
    .unwrap();

  assert!(!s.insert(Collection::Profiles, "u1", obj(json!({ "name": "B" }))).await.unwrap());
  let doc = s.get(Collection::Profiles, "u1").await.unwrap().unwrap();
  assert_eq!(doc.fields["name"], "Edited");
}

#[tokio::test]
async fn delete_removes_document() {
  let s = store().await;
  let id = s
    .create(Collection::Tasks, obj(json!({ "ownerId": "u1" })))
    .await
    .unwrap();
  s.delete(Collection::Tasks, &id).await.unwrap();
  assert!(s.get(Collection::Tasks, &id).await.unwrap().is_none());

  // Deleting again is not an error.
  s.delete(Collection::Tasks, &id).await.unwrap();
}

#[tokio::test]
async fn nested_filter_values_are_rejected() {
  let s = store().await;
  let q = Query::owned_by("u1").filter("tags", json!(["a"]));
  assert!(matches!(
    s.query(Collection::Tasks, &q).await,
    Err(Error::UnsupportedFilter(_))
  ));
}

// ─── Through the access layer ────────────────────────────────────────────────

fn alice() -> Session {
  Session::from(Principal {
    id:           "alice".into(),
    display_name: Some("Alice".into()),
    email:        None,
    photo_url:    None,
  })
}

#[tokio::test]
async fn access_layer_round_trip() {
  let s = store().await;
  let session = alice();

  let maths = subjects::create(&s, &session, NewSubject::new("Maths")).await.unwrap();
  for day in [12, 10, 11] {
    tasks::create(&s, &session, NewTask {
      title:       format!("Problem set {day}"),
      description: None,
      subject_id:  maths.clone(),
      date:        Utc.with_ymd_and_hms(2024, 3, day, 8, 0, 0).unwrap(),
      priority:    Priority::Medium,
    })
    .await
    .unwrap();
  }

  let listed = tasks::list_mine(&s, &session).await.unwrap();
  let titles: Vec<_> = listed.iter().map(|t| t.title.as_str()).collect();
  assert_eq!(titles, ["Problem set 10", "Problem set 11", "Problem set 12"]);

  tasks::set_completed(&s, &session, &listed[0].id, true).await.unwrap();
  assert_eq!(tasks::list_by_status(&s, &session, true).await.unwrap().len(), 1);

  let err = subjects::delete(&s, &session, &maths).await.unwrap_err();
  assert!(matches!(err, CoreError::HasDependents { tasks: 3, .. }));
}

#[tokio::test]
async fn cleared_optional_fields_read_back_as_none() {
  let s = store().await;
  let session = alice();
  let id = subjects::create(
    &s,
    &session,
    NewSubject { name: "Art".into(), color: Some("#f00".into()) },
  )
  .await
  .unwrap();

  subjects::update(&s, &session, &id, SubjectPatch { name: None, color: Some(None) })
    .await
    .unwrap();
  assert!(subjects::get(&s, &session, &id).await.unwrap().color.is_none());
}

#[tokio::test]
async fn assignments_list_newest_first() {
  let s = store().await;
  let session = alice();
  let due = Utc.with_ymd_and_hms(2024, 4, 1, 17, 0, 0).unwrap();

  let first = assignments::create(&s, &session, NewAssignment {
    title:      "First".into(),
    due_date:   due,
    subject_id: "s".into(),
  })
  .await
  .unwrap();
  tokio::time::sleep(std::time::Duration::from_millis(5)).await;
  let second = assignments::create(&s, &session, NewAssignment {
    title:      "Second".into(),
    due_date:   due,
    subject_id: "s".into(),
  })
  .await
  .unwrap();

  let listed = assignments::list_mine(&s, &session).await.unwrap();
  let ids: Vec<_> = listed.iter().map(|a| a.id.as_str()).collect();
  assert_eq!(ids, [second.as_str(), first.as_str()]);
}

#[tokio::test]
async fn profile_lifecycle() {
  let s = store().await;
  let session = alice();

  let profile = profiles::ensure_exists(&s, &session, None).await.unwrap();
  assert_eq!(profile.name, "Alice");
  assert_eq!(profile.email, "");

  let updated = profiles::update_mine(
    &s,
    &session,
    ProfilePatch { name: Some("Alice Liddell".into()), photo_url: Some(Some("https://x/a.png".into())) },
  )
  .await
  .unwrap();
  assert_eq!(updated.name, "Alice Liddell");
  assert_eq!(updated.photo_url.as_deref(), Some("https://x/a.png"));
  assert!(updated.updated_at >= profile.updated_at);
}
