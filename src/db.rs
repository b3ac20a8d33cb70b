use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePoolOptions, Pool, Sqlite};

pub type Db = Pool<Sqlite>;

/// Open the database, creating the file first if it doesn't exist.
/// `sqlite::memory:` gets a single-connection pool.
pub async fn connect(url: &str) -> Result<Db, sqlx::Error> {
    if is_in_memory(url) {
        tracing::warn!("using an in-memory database, data is lost on exit");
        return connect_in_memory().await;
    }

    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        tracing::info!(url, "creating database");
        Sqlite::create_database(url).await?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await?;
    tracing::info!("connection to the database is successful");
    Ok(pool)
}

/// Single-connection in-memory database, used by `connect` for memory URLs
/// and by tests. Every connection to `sqlite::memory:` is a separate
/// database, so the pool must never open a second one.
pub async fn connect_in_memory() -> Result<Db, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
}

fn is_in_memory(url: &str) -> bool {
    let rest = url.trim_start_matches("sqlite:").trim_start_matches("//");
    rest == ":memory:" || rest.starts_with(":memory:?") || url.contains("mode=memory")
}

pub async fn init_schema(pool: &Db) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        username TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL
    );"#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"CREATE TABLE IF NOT EXISTS todos (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        completed BOOLEAN NOT NULL DEFAULT 0,
        owner_id INTEGER NOT NULL REFERENCES users(id)
    );"#,
    )
    .execute(pool)
    .await?;

    tracing::debug!("schema ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_memory_urls() {
        assert!(is_in_memory("sqlite::memory:"));
        assert!(is_in_memory("sqlite://:memory:"));
        assert!(!is_in_memory("sqlite://todos.db"));
    }

    #[tokio::test]
    async fn memory_url_keeps_one_database() {
        let pool = connect("sqlite::memory:").await.unwrap();
        init_schema(&pool).await.unwrap();
        sqlx::query("INSERT INTO users (username, password_hash) VALUES ('ada', 'x')")
            .execute(&pool)
            .await
            .unwrap();
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
