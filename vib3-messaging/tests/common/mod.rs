#![allow(dead_code)]

use std::sync::Arc;

use diesel::pg::PgConnection;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use metrics_exporter_prometheus::PrometheusBuilder;
use uuid::Uuid;

use vib3_messaging::chat::body::OutgoingMessage;
use vib3_messaging::chat::roles::ChatType;
use vib3_messaging::config::AppConfig;
use vib3_messaging::models::{ChatSettings, CreateChatRequest};
use vib3_messaging::AppState;
use vib3_shared::middleware::{encode_access_token, jwt_secret};
use vib3_shared::types::auth::{Claims, UserRole};
use vib3_shared::types::UserPair;

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

pub fn insert_user(conn: &mut PgConnection, name: &str) -> Uuid {
    let id = Uuid::new_v4();
    conn.batch_execute(&format!(
        "INSERT INTO users (id, email, password_hash, name) VALUES ('{id}', '{id}@vib3.test', 'x', '{name}');"
    ))
    .expect("insert user");
    id
}

/// Inserts the pair's match row, promoted or not.
pub fn insert_match(conn: &mut PgConnection, a: Uuid, b: Uuid, matched: bool) -> Uuid {
    let id = Uuid::new_v4();
    let pair = UserPair::new(a, b).expect("distinct users");
    conn.batch_execute(&format!(
        "INSERT INTO matches (id, user_low, user_high, matched) VALUES ('{id}', '{}', '{}', {matched});",
        pair.low(),
        pair.high(),
    ))
    .expect("insert match");
    id
}

pub fn chat_request(chat_type: ChatType, participant_ids: Vec<Uuid>) -> CreateChatRequest {
    CreateChatRequest {
        chat_type,
        participant_ids,
        name: match chat_type {
            ChatType::Group => Some("Weekend plans".into()),
            ChatType::Direct => None,
        },
        description: None,
        avatar_url: None,
        settings: ChatSettings::default(),
    }
}

pub fn text(content: &str) -> OutgoingMessage {
    OutgoingMessage::new(Some(content.into()), None, None, None).unwrap()
}
