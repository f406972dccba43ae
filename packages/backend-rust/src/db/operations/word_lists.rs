use sqlx::SqliteConnection;

pub async fn insert_word_if_absent(
    conn: &mut SqliteConnection,
    language: &str,
    level: &str,
    word: &str,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"INSERT OR IGNORE INTO "word_lists" ("language","level","word") VALUES (?, ?, ?)"#,
    )
    .bind(language)
    .bind(level)
    .bind(word)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn select_words(
    conn: &mut SqliteConnection,
    language: &str,
    level: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar(
        r#"SELECT "word" FROM "word_lists" WHERE "language" = ? AND "level" = ? ORDER BY "word" ASC"#,
    )
    .bind(language)
    .bind(level)
    .fetch_all(&mut *conn)
    .await
}
