use lexi_algo::{MemoryState, Rating};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqliteConnection};

use super::{decode_error, from_millis, to_millis};
use crate::models::ReviewLogEntry;

pub async fn insert_log(conn: &mut SqliteConnection, log: &ReviewLogEntry) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO "review_log" ("id","reviewTimeMs","word","language","rating","state")
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&log.id)
    .bind(to_millis(log.review_time))
    .bind(&log.word)
    .bind(&log.language)
    .bind(log.rating.as_i64())
    .bind(log.state.as_i64())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

pub async fn select_history(
    conn: &mut SqliteConnection,
    word: &str,
    language: &str,
) -> Result<Vec<ReviewLogEntry>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id","reviewTimeMs","word","language","rating","state"
        FROM "review_log"
        WHERE "word" = ? AND "language" = ?
        ORDER BY "reviewTimeMs" ASC, rowid ASC
        "#,
    )
    .bind(word)
    .bind(language)
    .fetch_all(&mut *conn)
    .await?;
    rows.iter().map(map_log_row).collect()
}

fn map_log_row(row: &SqliteRow) -> Result<ReviewLogEntry, sqlx::Error> {
    let rating_code: i64 = row.try_get("rating")?;
    let state_code: i64 = row.try_get("state")?;
    Ok(ReviewLogEntry {
        id: row.try_get("id")?,
        review_time: from_millis(row.try_get("reviewTimeMs")?, "reviewTimeMs")?,
        word: row.try_get("word")?,
        language: row.try_get("language")?,
        rating: Rating::from_i64(rating_code)
            .ok_or_else(|| decode_error("rating", format!("unknown rating {rating_code}")))?,
        state: MemoryState::from_i64(state_code)
            .ok_or_else(|| decode_error("state", format!("unknown memory state {state_code}")))?,
    })
}
