use chrono::{DateTime, Utc};
use lexi_algo::MemoryState;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{decode_error, from_millis, to_millis};
use crate::models::VocabularyEntry;

const ENTRY_COLUMNS: &str = r#""word","language","translation","state","dueMs","stability","difficulty","lastReviewMs","step""#;

pub async fn select_entry(
    conn: &mut SqliteConnection,
    word: &str,
    language: &str,
) -> Result<Option<VocabularyEntry>, sqlx::Error> {
    let sql = format!(r#"SELECT {ENTRY_COLUMNS} FROM "vocabulary" WHERE "word" = ? AND "language" = ? LIMIT 1"#);
    let row = sqlx::query(&sql)
        .bind(word)
        .bind(language)
        .fetch_optional(&mut *conn)
        .await?;
    row.as_ref().map(map_entry_row).transpose()
}

/// Insert a new entry; returns `false` when the key already exists.
pub async fn insert_entry_if_absent(
    conn: &mut SqliteConnection,
    entry: &VocabularyEntry,
    created_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        INSERT INTO "vocabulary"
          ("word","language","translation","state","dueMs","stability","difficulty","lastReviewMs","step","createdMs")
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT ("word","language") DO NOTHING
        "#,
    )
    .bind(&entry.word)
    .bind(&entry.language)
    .bind(entry.translation.as_deref())
    .bind(entry.state.as_i64())
    .bind(to_millis(entry.due))
    .bind(entry.stability)
    .bind(entry.difficulty)
    .bind(entry.last_review.map(to_millis))
    .bind(i64::from(entry.step))
    .bind(to_millis(created_at))
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Set the translation only where none is stored yet.
pub async fn fill_missing_translation(
    conn: &mut SqliteConnection,
    word: &str,
    language: &str,
    translation: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"UPDATE "vocabulary" SET "translation" = ?
           WHERE "word" = ? AND "language" = ? AND ("translation" IS NULL OR "translation" = '')"#,
    )
    .bind(translation)
    .bind(word)
    .bind(language)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Overwrite the memory fields of an existing entry; returns rows touched.
pub async fn update_memory(
    conn: &mut SqliteConnection,
    entry: &VocabularyEntry,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE "vocabulary"
        SET "state" = ?, "dueMs" = ?, "stability" = ?, "difficulty" = ?, "lastReviewMs" = ?, "step" = ?
        WHERE "word" = ? AND "language" = ?
        "#,
    )
    .bind(entry.state.as_i64())
    .bind(to_millis(entry.due))
    .bind(entry.stability)
    .bind(entry.difficulty)
    .bind(entry.last_review.map(to_millis))
    .bind(i64::from(entry.step))
    .bind(&entry.word)
    .bind(&entry.language)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected())
}

pub async fn select_due(
    conn: &mut SqliteConnection,
    as_of: DateTime<Utc>,
) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let sql = format!(
        r#"SELECT {ENTRY_COLUMNS} FROM "vocabulary" WHERE "dueMs" <= ? ORDER BY "dueMs" ASC, "language" ASC, "word" ASC"#
    );
    let rows = sqlx::query(&sql)
        .bind(to_millis(as_of))
        .fetch_all(&mut *conn)
        .await?;
    rows.iter().map(map_entry_row).collect()
}

pub async fn select_all(conn: &mut SqliteConnection) -> Result<Vec<VocabularyEntry>, sqlx::Error> {
    let sql = format!(r#"SELECT {ENTRY_COLUMNS} FROM "vocabulary" ORDER BY "language" ASC, "word" ASC"#);
    let rows = sqlx::query(&sql).fetch_all(&mut *conn).await?;
    rows.iter().map(map_entry_row).collect()
}

fn map_entry_row(row: &SqliteRow) -> Result<VocabularyEntry, sqlx::Error> {
    let state_code: i64 = row.try_get("state")?;
    let state = MemoryState::from_i64(state_code)
        .ok_or_else(|| decode_error("state", format!("unknown memory state {state_code}")))?;
    let step: i64 = row.try_get("step")?;
    let step = u32::try_from(step).map_err(|_| decode_error("step", format!("invalid step {step}")))?;
    let last_review = row
        .try_get::<Option<i64>, _>("lastReviewMs")?
        .map(|ms| from_millis(ms, "lastReviewMs"))
        .transpose()?;

    Ok(VocabularyEntry {
        word: row.try_get("word")?,
        language: row.try_get("language")?,
        translation: row.try_get("translation")?,
        state,
        due: from_millis(row.try_get("dueMs")?, "dueMs")?,
        stability: row.try_get("stability")?,
        difficulty: row.try_get("difficulty")?,
        last_review,
        step,
    })
}
