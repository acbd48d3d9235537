#![allow(dead_code)]

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use metrics_exporter_prometheus::PrometheusBuilder;
use uuid::Uuid;

use vib3_shared::clients::{MediaConfig, MediaStore};
use vib3_shared::middleware::{encode_access_token, jwt_secret};
use vib3_shared::types::auth::{Claims, UserRole};
use vib3_user::config::AppConfig;
use vib3_user::AppState;

const MIGRATIONS: [&str; 4] = [
    include_str!("../../../migrations/2024-06-01-000001_create_users/up.sql"),
    include_str!("../../../migrations/2024-06-01-000002_create_matches/up.sql"),
    include_str!("../../../migrations/2024-06-01-000003_create_chats/up.sql"),
    include_str!("../../../migrations/2024-06-01-000004_create_messages/up.sql"),
];

/// State whose pool never connects; enough for requests rejected before any query.
pub fn offline_state() -> Arc<AppState> {
    let manager = ConnectionManager::<PgConnection>::new("postgres://offline.invalid/vib3");
    let db = Pool::builder()
        .max_size(1)
        .connection_timeout(std::time::Duration::from_millis(200))
        .build_unchecked(manager);

    Arc::new(AppState {
        db,
        config: AppConfig::default(),
        media: MediaStore::new(&MediaConfig::default()),
        metrics: PrometheusBuilder::new().build_recorder().handle(),
    })
}

pub fn bearer_for(user_id: Uuid) -> String {
    let claims = Claims::new(user_id, UserRole::User, 3600);
    format!("Bearer {}", encode_access_token(&claims, &jwt_secret()).unwrap())
}

/// A connection inside a never-committed transaction, with the schema
/// migrated into a throwaway namespace. `None` when no test database is set.
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
