//! Collection tables
//!
//! Owner references are stored as JSONB `{id, username}` documents, mirroring how issues,
//! comments and activities embed their owner. Deletes match on `->>'id'`.

use deadpool_postgres::Pool;

use crate::types::StartupError;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id UUID PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    email VARCHAR(255) UNIQUE NOT NULL,
    username VARCHAR(50) UNIQUE NOT NULL,
    password VARCHAR(255) NOT NULL DEFAULT '',
    role VARCHAR(16) NOT NULL DEFAULT 'user',
    image VARCHAR(255) NOT NULL DEFAULT 'default.jpg',
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE IF NOT EXISTS issues (
    id UUID PRIMARY KEY,
    user_id JSONB NOT NULL,
    body JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS issues_owner_idx ON issues ((user_id->>'id'));

CREATE TABLE IF NOT EXISTS comments (
    id UUID PRIMARY KEY,
    author JSONB NOT NULL,
    body JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS comments_author_idx ON comments ((author->>'id'));

CREATE TABLE IF NOT EXISTS activities (
    id UUID PRIMARY KEY,
    category VARCHAR(32) NOT NULL,
    user_id JSONB NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
CREATE INDEX IF NOT EXISTS activities_owner_idx ON activities ((user_id->>'id'));
"#;

/// Create any missing tables and indexes
pub async fn ensure_schema(pool: &Pool) -> Result<(), StartupError> {
    let client = pool
        .get()
        .await
        .map_err(|e| StartupError::Database(format!("Failed to get database connection: {e}")))?;

    client
        .batch_execute(SCHEMA)
        .await
        .map_err(|e| StartupError::Database(format!("Failed to create tables: {e}")))?;

    log::info!("Database schema is up to date");
    Ok(())
}
