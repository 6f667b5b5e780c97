//! In-band migration runner (spec §4.7 "Schema evolution").
//!
//! Grounded on `arkCyber-Matrixon`'s `matrixon-db::migrations` (a
//! migrations table + ordered `CREATE TABLE IF NOT EXISTS` statements run
//! in a transaction), extended with the spec's version-tracking table and
//! optional reverse SQL per migration.

use sqlx::PgPool;
use tracing::info;

use gw_domain::{Error, Result};

pub struct Migration {
    pub version: i64,
    pub description: &'static str,
    pub up: &'static [&'static str],
    pub down: Option<&'static [&'static str]>,
}

/// Ordered, append-only migration set. New migrations are added at the
/// end with a strictly increasing `version`.
pub fn all() -> Vec<Migration> {
    vec![
        Migration {
            version: 1,
            description: "initial schema: calls, conversations, messages, conversation_metrics, system_events",
            up: &[
                r#"CREATE TABLE IF NOT EXISTS calls (
    call_id TEXT PRIMARY KEY,
    caller_number TEXT NOT NULL,
    called_number TEXT NOT NULL,
    trunk_name TEXT NOT NULL,
    room_name TEXT NOT NULL,
    status TEXT NOT NULL,
    start_time TIMESTAMPTZ NOT NULL,
    answer_time TIMESTAMPTZ,
    end_time TIMESTAMPTZ,
    end_reason TEXT,
    metadata JSONB NOT NULL DEFAULT '{}'::jsonb,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#,
                r#"CREATE INDEX IF NOT EXISTS idx_calls_status_start_time ON calls (status, start_time)"#,
                r#"CREATE TABLE IF NOT EXISTS conversations (
    conversation_id UUID PRIMARY KEY,
    call_id TEXT NOT NULL REFERENCES calls (call_id) ON DELETE CASCADE,
    model TEXT NOT NULL,
    system_prompt TEXT,
    summary TEXT,
    topic TEXT,
    started_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    ended_at TIMESTAMPTZ
)"#,
                r#"CREATE INDEX IF NOT EXISTS idx_conversations_call_id ON conversations (call_id)"#,
                r#"CREATE TABLE IF NOT EXISTS messages (
    message_id UUID PRIMARY KEY,
    conversation_id UUID NOT NULL REFERENCES conversations (conversation_id) ON DELETE CASCADE,
    sequence_number BIGINT NOT NULL,
    role TEXT NOT NULL,
    content TEXT NOT NULL,
    processing_ms BIGINT,
    stt_meta JSONB,
    llm_meta JSONB,
    tts_meta JSONB,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (conversation_id, sequence_number)
)"#,
                r#"CREATE TABLE IF NOT EXISTS conversation_metrics (
    conversation_id UUID PRIMARY KEY REFERENCES conversations (conversation_id) ON DELETE CASCADE,
    user_message_count BIGINT NOT NULL DEFAULT 0,
    assistant_message_count BIGINT NOT NULL DEFAULT 0,
    avg_processing_ms DOUBLE PRECISION NOT NULL DEFAULT 0,
    min_processing_ms BIGINT NOT NULL DEFAULT 0,
    max_processing_ms BIGINT NOT NULL DEFAULT 0,
    sum_processing_ms BIGINT NOT NULL DEFAULT 0,
    total_llm_tokens_in BIGINT NOT NULL DEFAULT 0,
    total_llm_tokens_out BIGINT NOT NULL DEFAULT 0,
    total_cost_usd DOUBLE PRECISION NOT NULL DEFAULT 0,
    total_tts_cost_usd DOUBLE PRECISION NOT NULL DEFAULT 0,
    total_stt_cost_usd DOUBLE PRECISION NOT NULL DEFAULT 0,
    mean_stt_confidence DOUBLE PRECISION NOT NULL DEFAULT 0,
    total_audio_seconds DOUBLE PRECISION NOT NULL DEFAULT 0,
    sla_violation_count BIGINT NOT NULL DEFAULT 0,
    error_count BIGINT NOT NULL DEFAULT 0,
    retry_count BIGINT NOT NULL DEFAULT 0,
    computed_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#,
                r#"CREATE TABLE IF NOT EXISTS system_events (
    event_id UUID PRIMARY KEY,
    event_type TEXT NOT NULL,
    severity TEXT NOT NULL,
    message TEXT NOT NULL,
    component TEXT,
    call_id TEXT,
    conversation_id UUID,
    metadata JSONB,
    stack_trace TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
)"#,
                r#"CREATE INDEX IF NOT EXISTS idx_system_events_created_at ON system_events (created_at)"#,
            ],
            down: Some(&[
                "DROP TABLE IF EXISTS system_events",
                "DROP TABLE IF EXISTS conversation_metrics",
                "DROP TABLE IF EXISTS messages",
                "DROP TABLE IF EXISTS conversations",
                "DROP TABLE IF EXISTS calls",
            ]),
        },
    ]
}

async fn ensure_version_table(pool: &PgPool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_versions (
            version BIGINT PRIMARY KEY,
            description TEXT NOT NULL,
            applied_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| Error::Internal(e.to_string()))?;
    Ok(())
}

/// Applies every migration whose version is not yet recorded in
/// `schema_versions`, in ascending order, each inside its own transaction.
/// Idempotent: a second call with nothing pending is a no-op (spec §8
/// round-trip law).
pub async fn migrate_to_latest(pool: &PgPool) -> Result<Vec<i64>> {
    ensure_version_table(pool).await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_versions")
        .fetch_all(pool)
        .await
        .map_err(|e| Error::Internal(e.to_string()))?;

    let mut newly_applied = Vec::new();
    for migration in all() {
        if applied.contains(&migration.version) {
            continue;
        }

        let mut tx = pool.begin().await.map_err(|e| Error::Internal(e.to_string()))?;
        for statement in migration.up {
            sqlx::query(statement)
                .execute(&mut *tx)
                .await
                .map_err(|e| Error::Internal(format!("migration {}: {e}", migration.version)))?;
        }
        sqlx::query("INSERT INTO schema_versions (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| Error::Internal(e.to_string()))?;
        tx.commit().await.map_err(|e| Error::Internal(e.to_string()))?;

        info!(version = migration.version, description = migration.description, "applied migration");
        newly_applied.push(migration.version);
    }

    Ok(newly_applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migration_versions_are_strictly_increasing() {
        let migrations = all();
        let mut prev = 0;
        for m in &migrations {
            assert!(m.version > prev, "migration versions must be strictly increasing");
            prev = m.version;
        }
    }

    #[test]
    fn every_migration_has_a_description() {
        for m in all() {
            assert!(!m.description.is_empty());
        }
    }
}
