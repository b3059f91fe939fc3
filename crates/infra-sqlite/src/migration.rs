// Schema migrations
//
// Each script records its own version in schema_version; scripts above the
// stored version are applied in order, one transaction per script.

use sqlx::SqlitePool;
use tracing::{debug, info};

struct Migration {
    version: i64,
    description: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "lead lists and leads",
        sql: include_str!("../migrations/001_initial_schema.sql"),
    },
    Migration {
        version: 2,
        description: "sessions and key-value cache",
        sql: include_str!("../migrations/002_sessions_and_cache.sql"),
    },
];

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    let current = schema_version(pool).await?;
    let pending: Vec<&Migration> = MIGRATIONS.iter().filter(|m| m.version > current).collect();

    if pending.is_empty() {
        debug!(version = current, "Schema up to date");
        return Ok(());
    }

    for migration in pending {
        info!(
            version = migration.version,
            description = migration.description,
            "Applying migration"
        );
        apply(pool, migration.sql).await?;
    }

    info!(version = schema_version(pool).await?, "Schema migrated");
    Ok(())
}

async fn schema_version(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    let has_table: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version')",
    )
    .fetch_one(pool)
    .await?;
    if !has_table {
        return Ok(0);
    }

    let version: Option<i64> = sqlx::query_scalar("SELECT MAX(version) FROM schema_version")
        .fetch_one(pool)
        .await?;
    Ok(version.unwrap_or(0))
}

/// Statements are separated by `;`; `--` comment lines are dropped
fn statements(sql: &str) -> impl Iterator<Item = String> + '_ {
    sql.split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .map(|stmt| stmt.trim().to_string())
        .filter(|stmt| !stmt.is_empty())
}

async fn apply(pool: &SqlitePool, sql: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;
    for stmt in statements(sql) {
        sqlx::query(&stmt).execute(&mut *tx).await?;
    }
    tx.commit().await
}
