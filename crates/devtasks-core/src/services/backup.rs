//! Raw database file backup

use std::path::Path;

use sqlx::SqliteConnection;

use crate::db::Database;
use crate::error::{Error, Result};
use crate::models::BackupInfo;

#[derive(Clone)]
pub struct BackupService {
    db: Database,
}

impl BackupService {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Copy the database file to `dest`.
    ///
    /// The WAL is checkpointed into the main file first, then the copy runs
    /// under a write lock so no commit or auto-checkpoint touches the main
    /// file mid-copy. A partially written `dest` is removed on failure.
    pub async fn backup(&self, dest: &Path) -> Result<BackupInfo> {
        let _maintenance = self.db.maintenance().await;

        let source = self.db.path().to_path_buf();
        if let (Ok(a), Ok(b)) = (std::fs::canonicalize(&source), std::fs::canonicalize(dest)) {
            if a == b {
                return Err(Error::validation("Backup destination is the live database file"));
            }
        }

        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let mut conn = self.db.pool.acquire().await?;
        checkpoint(&mut conn).await?;

        sqlx::query("BEGIN IMMEDIATE").execute(&mut *conn).await?;
        let copied = tokio::fs::copy(&source, dest).await;
        sqlx::query("ROLLBACK").execute(&mut *conn).await?;

        match copied {
            Ok(bytes) => {
                log::info!("Backed up {} to {} ({} bytes)", source.display(), dest.display(), bytes);
                Ok(BackupInfo {
                    path: dest.display().to_string(),
                    bytes,
                })
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(dest).await;
                Err(e.into())
            }
        }
    }

    /// `backup` for collaborators that only need a yes/no answer.
    pub async fn backup_db(&self, dest: &Path) -> bool {
        match self.backup(dest).await {
            Ok(_) => true,
            Err(e) => {
                log::error!("Backup to {} failed: {}", dest.display(), e);
                false
            }
        }
    }
}

/// Flush the WAL into the main file and truncate it.
async fn checkpoint(conn: &mut SqliteConnection) -> Result<()> {
    let (busy, wal_frames, checkpointed): (i64, i64, i64) =
        sqlx::query_as("PRAGMA wal_checkpoint(TRUNCATE)")
            .fetch_one(&mut *conn)
            .await?;
    if busy != 0 {
        return Err(Error::internal(format!(
            "WAL checkpoint incomplete ({} of {} frames)",
            checkpointed, wal_frames
        )));
    }
    Ok(())
}
