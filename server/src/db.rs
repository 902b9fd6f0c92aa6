use std::thread;
use std::time::Duration;

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager, CustomizeConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use thiserror::Error;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub type DbConn = r2d2::PooledConnection<ConnectionManager<SqliteConnection>>;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Failed to create database pool: {0}")]
    Pool(#[from] r2d2::PoolError),

    #[error("Failed to connect to database: {0}")]
    Connection(#[from] ConnectionError),

    #[error("Database query failed: {0}")]
    Query(#[from] diesel::result::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(String),

    #[error("Database still unavailable after {0} attempts")]
    Unavailable(u32),
}

/// Per-connection SQLite settings. Foreign keys are off by default in SQLite
/// and the association tables rely on `ON DELETE CASCADE`.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, r2d2::Error> for ConnectionOptions {
    fn on_acquire(&self, conn: &mut SqliteConnection) -> Result<(), r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;",
            self.busy_timeout.as_millis()
        ))
        .map_err(r2d2::Error::QueryError)
    }
}

pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, DbError> {
    let manager = ConnectionManager::<SqliteConnection>::new(database_url);
    let pool = r2d2::Pool::builder()
        .max_size(max_size)
        .connection_customizer(Box::new(ConnectionOptions {
            busy_timeout: BUSY_TIMEOUT,
        }))
        .build(manager)?;

    // Run pending migrations on startup
    let mut conn = pool.get()?;
    run_migrations(&mut conn)?;

    Ok(pool)
}

pub fn run_migrations(conn: &mut SqliteConnection) -> Result<(), DbError> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| DbError::Migration(e.to_string()))?;

    for version in applied {
        tracing::info!(%version, "applied migration");
    }

    Ok(())
}

/// Block until the database accepts connections, polling once per `interval`.
pub fn wait_for_db(database_url: &str, attempts: u32, interval: Duration) -> Result<(), DbError> {
    for attempt in 1..=attempts {
        let attempt_result = SqliteConnection::establish(database_url)
            .map_err(DbError::from)
            .and_then(|mut conn| conn.batch_execute("SELECT 1").map_err(DbError::from));

        match attempt_result {
            Ok(()) => {
                tracing::info!("Database available");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(attempt, "Database unavailable, waiting {:?}: {}", interval, e);
                if attempt < attempts {
                    thread::sleep(interval);
                }
            }
        }
    }

    Err(DbError::Unavailable(attempts))
}

/// Fresh in-memory database with all migrations applied.
#[cfg(test)]
pub(crate) fn test_connection() -> SqliteConnection {
    let mut conn =
        SqliteConnection::establish(":memory:").expect("Failed to open in-memory database");
    conn.batch_execute("PRAGMA foreign_keys = ON;")
        .expect("Failed to enable foreign keys");
    run_migrations(&mut conn).expect("Failed to migrate test database");
    conn
}
