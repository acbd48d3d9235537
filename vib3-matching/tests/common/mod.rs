#![allow(dead_code)]

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use metrics_exporter_prometheus::PrometheusBuilder;
use uuid::Uuid;

use vib3_matching::config::AppConfig;
use vib3_matching::AppState;
use vib3_shared::middleware::{encode_access_token, jwt_secret};
use vib3_shared::types::auth::{Claims, UserRole};

const MIGRATIONS: [&str; 4] = [
    include_str!("../../../migrations/2024-06-01-000001_create_users/up.sql"),
    include_str!("../../../migrations/2024-06-01-000002_create_matches/up.sql"),
    include_str!("../../../migrations/2024-06-01-000003_create_chats/up.sql"),
    include_str!("../../../migrations/2024-06-01-000004_create_messages/up.sql"),
];

pub fn offline_state() -> Arc<AppState> {
    let manager = ConnectionManager::<PgConnection>::new("postgres://offline.invalid/vib3");
    let db = Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_millis(200))
        .build_unchecked(manager);

    Arc::new(AppState {
        db,
        config: AppConfig::default(),
        metrics: PrometheusBuilder::new().build_recorder().handle(),
    })
}

pub fn bearer_for(user_id: Uuid) -> String {
    let claims = Claims::new(user_id, UserRole::User, 3600);
    format!("Bearer {}", encode_access_token(&claims, &jwt_secret()).unwrap())
}

pub fn test_conn() -> Option<PgConnection> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let mut conn = PgConnection::establish(&url).expect("connect to TEST_DATABASE_URL");
    conn.begin_test_transaction().expect("begin test transaction");

    let schema = format!("vib3_test_{}", Uuid::new_v4().simple());
    conn.batch_execute(&format!("CREATE SCHEMA {schema}; SET LOCAL search_path TO {schema}, public;"))
        .expect("create test schema");
    for migration in MIGRATIONS {
        conn.batch_execute(migration).expect("apply migration");
    }
    Some(conn)
}

pub struct Person<'a> {
    pub name: &'a str,
    pub age: i32,
    pub gender: &'a str,
    pub prefs: &'a [&'a str],
    pub at: Option<(f64, f64)>,
    pub age_range: (i32, i32),
    pub complete: bool,
}

impl<'a> Person<'a> {
    pub fn new(name: &'a str, age: i32, gender: &'a str, prefs: &'a [&'a str]) -> Self {
        Self { name, age, gender, prefs, at: Some((0.0, 0.0)), age_range: (18, 120), complete: true }
    }
}

/// Inserts a user row directly; the identity store is not linked here.
pub fn insert_person(conn: &mut PgConnection, p: &Person) -> Uuid {
    let id = Uuid::new_v4();
    let prefs = p
        .prefs
        .iter()
        .map(|g| format!("'{g}'"))
        .collect::<Vec<_>>()
        .join(",");
    let (lon, lat) = match p.at {
        Some((lon, lat)) => (lon.to_string(), lat.to_string()),
        None => ("NULL".into(), "NULL".into()),
    };
    conn.batch_execute(&format!(
        "INSERT INTO users (id, email, password_hash, name, age, gender, bio, longitude, latitude,
                            preferred_genders, age_min, age_max, profile_complete)
         VALUES ('{id}', '{id}@vib3.test', 'x', '{name}', {age}, '{gender}', 'hello', {lon}, {lat},
                 ARRAY[{prefs}]::TEXT[], {min}, {max}, {complete});",
        name = p.name,
        age = p.age,
        gender = p.gender,
        min = p.age_range.0,
        max = p.age_range.1,
        complete = p.complete,
    ))
    .expect("insert user");
    id
}
