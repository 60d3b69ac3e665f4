//! Durable store queries
//!
//! The document travels through this layer as its serialized JSON form;
//! parsing happens at the store layer so cache fills can reuse the raw
//! string without a decode/encode round trip.

use crate::Result;
use sqlx::SqlitePool;

/// Fetch the serialized state for a mitplan id, if the record exists
pub async fn fetch_state(pool: &SqlitePool, mitplan_id: &str) -> Result<Option<String>> {
    let state = sqlx::query_scalar::<_, String>(
        "SELECT state FROM mitplans WHERE mitplan_id = ?",
    )
    .bind(mitplan_id)
    .fetch_optional(pool)
    .await?;

    Ok(state)
}

/// Insert or replace the serialized state for a mitplan id
///
/// Keeps `created_at` from the original insert and refreshes `updated_at`.
/// An existing `owner_id` survives commits that do not carry one.
pub async fn upsert_state(
    pool: &SqlitePool,
    mitplan_id: &str,
    state: &str,
    owner_id: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO mitplans (mitplan_id, state, owner_id)
        VALUES (?, ?, ?)
        ON CONFLICT(mitplan_id) DO UPDATE SET
            state = excluded.state,
            owner_id = COALESCE(excluded.owner_id, mitplans.owner_id),
            updated_at = datetime('now')
        "#,
    )
    .bind(mitplan_id)
    .bind(state)
    .bind(owner_id)
    .execute(pool)
    .await?;

    Ok(())
}