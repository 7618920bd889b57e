//! Database module - SQLx with SQLite
//!
//! Owns the connection pool and the schema lifecycle: table creation,
//! additive column migrations and the first-run seed.

use crate::error::{Error, Result};
use crate::models::{DEFAULT_PROJECT_COLOR, DEFAULT_PROJECT_NAME};
use crate::utils::now_timestamp;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};

/// Environment variable overriding the database location
pub const DB_PATH_ENV: &str = "DEVTASKS_DB_PATH";

/// Environment variable overriding the pool size
pub const DB_MAX_CONNECTIONS_ENV: &str = "DEVTASKS_DB_MAX_CONNECTIONS";

const DB_FILE_NAME: &str = "devtasks.sqlite";

/// Columns added after the first release. Each entry is applied only when
/// `pragma_table_info` reports the column missing.
const COLUMN_MIGRATIONS: &[(&str, &str, &str)] = &[
    ("projects", "path", "TEXT"),
    ("tasks", "local_path", "TEXT"),
    ("tasks", "timer_start", "TEXT"),
    ("tasks", "category", "TEXT DEFAULT 'feature'"),
    ("tasks", "estimated_hours", "REAL DEFAULT 0"),
];

/// Connection settings for the store
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
    pub busy_timeout: Duration,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(5),
        }
    }

    /// Build a config from `DEVTASKS_DB_PATH` / `DEVTASKS_DB_MAX_CONNECTIONS`,
    /// falling back to the platform data directory.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::new(get_db_path()?);
        if let Ok(raw) = std::env::var(DB_MAX_CONNECTIONS_ENV) {
            let n: u32 = raw.trim().parse().map_err(|_| {
                Error::config(format!("{} must be a positive integer, got {:?}", DB_MAX_CONNECTIONS_ENV, raw))
            })?;
            if n == 0 {
                return Err(Error::config(format!("{} must be at least 1", DB_MAX_CONNECTIONS_ENV)));
            }
            config.max_connections = n;
        }
        Ok(config)
    }
}

/// What `ensure_schema` changed on this run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SchemaReport {
    /// `table.column` for every column migration applied
    pub applied_migrations: Vec<String>,
    pub seeded_default_project: bool,
}

/// Database state.
///
/// Cheap to clone; every clone shares one pool and one maintenance lock.
#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
    path: PathBuf,
    maintenance: Arc<Mutex<()>>,
}

impl Database {
    /// Create a new database connection with default path
    pub async fn new() -> Result<Self> {
        Self::connect(DatabaseConfig::from_env()?).await
    }

    /// Create a new database connection with a specific path
    pub async fn open(db_path: PathBuf) -> Result<Self> {
        Self::connect(DatabaseConfig::new(db_path)).await
    }

    /// Open the pool described by `config` and bring the schema up to date
    pub async fn connect(config: DatabaseConfig) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = config.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        log::info!("Connecting to database: {}", config.path.display());

        let options = SqliteConnectOptions::new()
            .filename(&config.path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        let db = Self {
            pool,
            path: config.path,
            maintenance: Arc::new(Mutex::new(())),
        };
        db.ensure_schema().await?;

        Ok(db)
    }

    /// Location of the main database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serializes whole-store operations (import, backup) against each other.
    pub(crate) async fn maintenance(&self) -> MutexGuard<'_, ()> {
        self.maintenance.lock().await
    }

    /// Create missing tables, apply column migrations, seed the default
    /// project. Safe to run on every start.
    pub async fn ensure_schema(&self) -> Result<SchemaReport> {
        log::info!("Running database migrations...");
        let mut report = SchemaReport::default();

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS projects (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                color TEXT NOT NULL DEFAULT '#ffffff',
                path TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                project_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL DEFAULT 'todo',
                priority TEXT NOT NULL DEFAULT 'medium',
                category TEXT NOT NULL DEFAULT 'feature',
                estimated_hours REAL NOT NULL DEFAULT 0 CHECK (estimated_hours >= 0),
                due_date TEXT,
                local_path TEXT,
                timer_start TEXT,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (project_id) REFERENCES projects(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS subtasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                is_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT,
                FOREIGN KEY (task_id) REFERENCES tasks(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE,
                color TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS task_tags (
                task_id INTEGER NOT NULL,
                tag_id INTEGER NOT NULL,
                PRIMARY KEY (task_id, tag_id),
                FOREIGN KEY (task_id) REFERENCES tasks(id),
                FOREIGN KEY (tag_id) REFERENCES tags(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS time_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                task_id INTEGER NOT NULL,
                start_time TEXT NOT NULL,
                end_time TEXT NOT NULL,
                duration_seconds INTEGER NOT NULL CHECK (duration_seconds >= 0),
                created_at TEXT,
                FOREIGN KEY (task_id) REFERENCES tasks(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        for (table, column, definition) in COLUMN_MIGRATIONS {
            if self.column_exists(table, column).await? {
                continue;
            }
            sqlx::query(&format!("ALTER TABLE {} ADD COLUMN {} {}", table, column, definition))
                .execute(&self.pool)
                .await?;
            log::info!("Added column {}.{}", table, column);
            report.applied_migrations.push(format!("{}.{}", table, column));
        }

        let normalized = self.normalize_legacy_rows().await?;
        if normalized > 0 {
            log::info!("Normalized {} rows written by an older release", normalized);
        }

        // SQLite cannot ADD COLUMN ... UNIQUE, so path uniqueness lives in an
        // index. NULL paths never collide.
        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_projects_path ON projects(path)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_project_id ON tasks(project_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_subtasks_task_id ON subtasks(task_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_time_logs_task_id ON time_logs(task_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_task_tags_tag_id ON task_tags(tag_id)")
            .execute(&self.pool)
            .await?;

        let (projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(&self.pool)
            .await?;
        if projects == 0 {
            sqlx::query("INSERT INTO projects (name, color, path, created_at) VALUES (?, ?, NULL, ?)")
                .bind(DEFAULT_PROJECT_NAME)
                .bind(DEFAULT_PROJECT_COLOR)
                .bind(now_timestamp())
                .execute(&self.pool)
                .await?;
            log::info!("Seeded default project");
            report.seeded_default_project = true;
        }

        log::info!("Database migrations completed");
        Ok(report)
    }

    /// Rewrite column values older releases stored in forms the models
    /// cannot read: cleared due dates as `''`, due dates as full datetimes,
    /// and NULL in columns that now carry defaults.
    async fn normalize_legacy_rows(&self) -> Result<u64> {
        let statements = [
            "UPDATE tasks SET due_date = substr(due_date, 1, 10) \
             WHERE length(due_date) > 10 AND date(substr(due_date, 1, 10)) IS NOT NULL",
            "UPDATE tasks SET due_date = NULL \
             WHERE due_date IS NOT NULL AND date(due_date) IS NOT due_date",
            "UPDATE tasks SET status = 'todo' WHERE status IS NULL",
            "UPDATE tasks SET priority = 'medium' WHERE priority IS NULL",
            "UPDATE tasks SET category = 'feature' WHERE category IS NULL",
            "UPDATE tasks SET estimated_hours = 0 \
             WHERE estimated_hours IS NULL OR typeof(estimated_hours) NOT IN ('integer', 'real')",
            "UPDATE subtasks SET is_completed = 0 WHERE is_completed IS NULL",
        ];

        let mut changed = 0;
        for sql in statements {
            changed += sqlx::query(sql).execute(&self.pool).await?.rows_affected();
        }
        changed += sqlx::query("UPDATE projects SET color = ? WHERE color IS NULL")
            .bind(DEFAULT_PROJECT_COLOR)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(changed)
    }

    async fn column_exists(&self, table: &str, column: &str) -> Result<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM pragma_table_info(?) WHERE name = ?")
                .bind(table)
                .bind(column)
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }
}

/// Get database file path
/// Priority: DEVTASKS_DB_PATH env var > default app data directory
pub fn get_db_path() -> Result<PathBuf> {
    // Check for environment variable override
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }

    // Default: use app data directory
    let dirs = directories::ProjectDirs::from("com", "devtasks", "DevTasks")
        .ok_or_else(|| Error::config("Could not determine project directories"))?;

    Ok(dirs.data_dir().join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex as StdMutex;
    use tempfile::TempDir;

    // Mutex to ensure env var tests don't run in parallel
    static ENV_MUTEX: StdMutex<()> = StdMutex::new(());

    #[test]
    fn test_get_db_path_default() {
        let _lock = ENV_MUTEX.lock().unwrap();
        // Without env var, should return default path
        std::env::remove_var(DB_PATH_ENV);
        let path = get_db_path().unwrap();
        assert!(path.to_string_lossy().contains(DB_FILE_NAME));
    }

    #[test]
    fn test_get_db_path_env_override() {
        let _lock = ENV_MUTEX.lock().unwrap();
        let test_path = "/tmp/test_devtasks.sqlite";
        std::env::set_var(DB_PATH_ENV, test_path);
        let path = get_db_path().unwrap();
        assert_eq!(path.to_string_lossy(), test_path);
        std::env::remove_var(DB_PATH_ENV);
    }

    #[test]
    fn test_config_rejects_bad_pool_size() {
        let _lock = ENV_MUTEX.lock().unwrap();
        std::env::set_var(DB_MAX_CONNECTIONS_ENV, "lots");
        let err = DatabaseConfig::from_env().unwrap_err();
        std::env::remove_var(DB_MAX_CONNECTIONS_ENV);
        assert!(err.to_string().contains(DB_MAX_CONNECTIONS_ENV));
    }

    #[tokio::test]
    async fn test_first_open_seeds_default_project() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("store.sqlite")).await.unwrap();

        let rows: Vec<(String, Option<String>)> = sqlx::query_as("SELECT name, path FROM projects")
            .fetch_all(&db.pool)
            .await
            .unwrap();
        assert_eq!(rows, vec![(DEFAULT_PROJECT_NAME.to_string(), None)]);
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("store.sqlite")).await.unwrap();

        let report = db.ensure_schema().await.unwrap();
        assert_eq!(report, SchemaReport::default());

        let (projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(projects, 1);
    }

    #[tokio::test]
    async fn test_reopen_does_not_reseed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("store.sqlite");
        let db = Database::open(path.clone()).await.unwrap();
        db.pool.close().await;

        let db = Database::open(path).await.unwrap();
        let (projects,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM projects")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(projects, 1);
    }

    #[tokio::test]
    async fn test_legacy_schema_gets_missing_columns() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.sqlite");

        // Layout written by the first release: no path/category/estimate/timer columns
        {
            let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
            let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
            sqlx::query(
                "CREATE TABLE projects (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
                 color TEXT DEFAULT '#ffffff', created_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
            )
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query(
                "CREATE TABLE tasks (id INTEGER PRIMARY KEY AUTOINCREMENT, project_id INTEGER, \
                 title TEXT NOT NULL, description TEXT, status TEXT DEFAULT 'todo', \
                 priority TEXT DEFAULT 'medium', due_date DATETIME, \
                 created_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
            )
            .execute(&pool)
            .await
            .unwrap();
            sqlx::query("INSERT INTO projects (name) VALUES ('Old')")
                .execute(&pool)
                .await
                .unwrap();
            sqlx::query("INSERT INTO tasks (project_id, title) VALUES (1, 'Legacy task')")
                .execute(&pool)
                .await
                .unwrap();
            pool.close().await;
        }

        let db = Database::open(path).await.unwrap();
        let report = db.ensure_schema().await.unwrap();
        // Everything was applied by `open`; the second pass is a no-op
        assert!(report.applied_migrations.is_empty());
        assert!(!report.seeded_default_project);

        for (table, column, _) in COLUMN_MIGRATIONS {
            assert!(db.column_exists(table, column).await.unwrap(), "{}.{}", table, column);
        }

        let (category, hours): (String, f64) =
            sqlx::query_as("SELECT category, estimated_hours FROM tasks WHERE id = 1")
                .fetch_one(&db.pool)
                .await
                .unwrap();
        assert_eq!(category, "feature");
        assert_eq!(hours, 0.0);
    }

    #[tokio::test]
    async fn test_legacy_rows_are_readable_after_open() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.sqlite");

        // Layout and values written by the desktop release
        {
            let options = SqliteConnectOptions::new().filename(&path).create_if_missing(true);
            let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
            for sql in [
                "CREATE TABLE projects (id INTEGER PRIMARY KEY AUTOINCREMENT, name TEXT NOT NULL, \
                 color TEXT DEFAULT '#ffffff', path TEXT UNIQUE, created_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
                "CREATE TABLE tasks (id INTEGER PRIMARY KEY AUTOINCREMENT, project_id INTEGER, \
                 title TEXT NOT NULL, description TEXT, status TEXT DEFAULT 'todo', \
                 priority TEXT DEFAULT 'medium', category TEXT DEFAULT 'feature', \
                 estimated_hours REAL DEFAULT 0, due_date DATETIME, local_path TEXT, \
                 timer_start DATETIME, created_at DATETIME DEFAULT CURRENT_TIMESTAMP)",
                "CREATE TABLE subtasks (id INTEGER PRIMARY KEY, task_id INTEGER, title TEXT, \
                 is_completed INTEGER, created_at DATETIME)",
                "INSERT INTO projects (name, color) VALUES ('Old', NULL)",
                "INSERT INTO tasks (project_id, title, due_date) VALUES (1, 'Cleared', '')",
                "INSERT INTO tasks (project_id, title, due_date) VALUES (1, 'Dated', '2025-03-14T00:00:00.000Z')",
                "INSERT INTO tasks (project_id, title, due_date, estimated_hours) VALUES (1, 'Plain', '2025-04-01', '')",
                "INSERT INTO subtasks (task_id, title) VALUES (1, 'Never toggled')",
            ] {
                sqlx::query(sql).execute(&pool).await.unwrap();
            }
            pool.close().await;
        }

        let store = crate::store::Store::open(path).await.unwrap();
        let mut tasks = store.get_tasks(Some(1)).await.unwrap();
        tasks.sort_by_key(|t| t.task.id);
        let due: Vec<Option<String>> = tasks
            .iter()
            .map(|t| t.task.due_date.map(|d| d.to_string()))
            .collect();
        assert_eq!(
            due,
            vec![None, Some("2025-03-14".to_string()), Some("2025-04-01".to_string())]
        );
        assert_eq!(tasks[2].task.estimated_hours, 0.0);

        let subtasks = store.get_subtasks(1).await.unwrap();
        assert!(!subtasks[0].is_completed);

        let projects = store.projects.list().await.unwrap();
        assert_eq!(projects[0].color, DEFAULT_PROJECT_COLOR);

        let document = store.export_data().await.unwrap();
        assert_eq!(document.tasks.len(), 3);
    }

    #[tokio::test]
    async fn test_project_path_is_unique() {
        let dir = TempDir::new().unwrap();
        let db = Database::open(dir.path().join("store.sqlite")).await.unwrap();

        sqlx::query("INSERT INTO projects (name, path) VALUES ('a', '/work/a')")
            .execute(&db.pool)
            .await
            .unwrap();
        let dup = sqlx::query("INSERT INTO projects (name, path) VALUES ('b', '/work/a')")
            .execute(&db.pool)
            .await;
        assert!(dup.is_err());

        // Several NULL paths are allowed
        sqlx::query("INSERT INTO projects (name, path) VALUES ('c', NULL)")
            .execute(&db.pool)
            .await
            .unwrap();
    }
}
