use sqlx::SqlitePool;

pub const SCHEMA_SQL: &str = include_str!("../../sql/schema.sql");
pub const SCHEMA_VERSION: &str = "1";

/// Split a SQL script on `;` outside of quoted strings/identifiers.
pub fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut in_single_quote = false;
    let mut in_double_quote = false;

    for ch in sql.chars() {
        match ch {
            '\'' if !in_double_quote => in_single_quote = !in_single_quote,
            '"' if !in_single_quote => in_double_quote = !in_double_quote,
            ';' if !in_single_quote && !in_double_quote => {
                push_statement(&mut statements, &current);
                current.clear();
                continue;
            }
            _ => {}
        }
        current.push(ch);
    }

    push_statement(&mut statements, &current);
    statements
}

fn push_statement(statements: &mut Vec<String>, raw: &str) {
    let sql = raw
        .lines()
        .filter(|line| !line.trim().starts_with("--"))
        .collect::<Vec<_>>()
        .join("\n");
    let trimmed = sql.trim();
    if !trimmed.is_empty() {
        statements.push(trimmed.to_string());
    }
}

/// Apply the embedded schema unless the version marker already matches.
pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let version: Option<String> =
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.as_deref() == Some(SCHEMA_VERSION) {
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for stmt in split_sql_statements(SCHEMA_SQL) {
        sqlx::query(&stmt).execute(&mut *tx).await?;
    }
    sqlx::query(r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', ?)"#)
        .bind(SCHEMA_VERSION)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!(version = SCHEMA_VERSION, "schema applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_ignores_semicolons_in_quotes() {
        let sql = "-- header\nCREATE TABLE \"a;b\" (x TEXT DEFAULT 'c;d');\n\nINSERT INTO t VALUES (1);";
        let statements = split_sql_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE TABLE \"a;b\""));
        assert_eq!(statements[1], "INSERT INTO t VALUES (1)");
    }

    #[test]
    fn test_embedded_schema_has_all_tables() {
        let statements = split_sql_statements(SCHEMA_SQL);
        for table in ["_db_metadata", "vocabulary", "review_log", "word_lists"] {
            let needle = format!("CREATE TABLE IF NOT EXISTS \"{table}\"");
            assert!(statements.iter().any(|s| s.starts_with(&needle)), "missing {table}");
        }
    }
}
