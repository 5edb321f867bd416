//! SQLite state store implementation
//!
//! ## Features
//!
//! - **Embedded**: No separate database server required
//! - **WAL mode**: API reads don't block the running cycle's writes
//! - **Connection pooling**: Efficient resource usage
//! - **Migrations**: Automatic schema versioning with sqlx
//!
//! Timestamps are stored as unix milliseconds.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Pool, Row, Sqlite};
use tracing::{debug, info, instrument, warn};

use super::backend::{HealthStatus, StateStore};
use super::error::{StorageError, StorageResult};
use crate::config::MonitorConfig;
use crate::{
    DeliveryState, NewNotification, NotificationKind, NotificationRecord, StorageFields,
    StorageIdentity, StorageRecord, StorageStatus,
};

/// SQLite state store
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    db_path: String,
}

impl SqliteStore {
    /// Open (or create) the database file and run migrations
    ///
    /// ## Example
    ///
    /// ```no_run
    /// # use storage_monitoring::storage::sqlite::SqliteStore;
    /// # async fn example() -> anyhow::Result<()> {
    /// let store = SqliteStore::new("./monitor.db").await?;
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip_all)]
    pub async fn new(db_path: impl AsRef<Path>) -> StorageResult<Self> {
        let db_path_str = db_path.as_ref().to_string_lossy().to_string();

        info!("initializing SQLite store at: {}", db_path_str);

        let options = SqliteConnectOptions::new()
            .filename(&db_path_str)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        debug!("running database migrations");
        sqlx::migrate!("./migrations").run(&pool).await?;
        info!("database migrations complete");

        Ok(Self {
            pool,
            db_path: db_path_str,
        })
    }

    fn timestamp_to_millis(dt: &DateTime<Utc>) -> i64 {
        dt.timestamp_millis()
    }

    fn millis_to_timestamp(millis: i64) -> StorageResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| StorageError::SerializationError(format!("bad timestamp {millis}")))
    }

    fn storage_from_row(row: &SqliteRow) -> StorageResult<StorageRecord> {
        Ok(StorageRecord {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            mount_path: row.try_get("mount_path")?,
            driver: row.try_get("driver")?,
            status: StorageStatus::from(row.try_get::<String, _>("status")?),
            last_check: Self::millis_to_timestamp(row.try_get("last_check")?)?,
        })
    }

    fn notification_from_row(row: &SqliteRow) -> StorageResult<NotificationRecord> {
        let kind: String = row.try_get("kind")?;
        let state: String = row.try_get("delivery_state")?;

        Ok(NotificationRecord {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            message: row.try_get("message")?,
            kind: NotificationKind::parse(&kind)
                .ok_or_else(|| StorageError::SerializationError(format!("bad kind {kind}")))?,
            delivery_state: DeliveryState::parse(&state)
                .ok_or_else(|| StorageError::SerializationError(format!("bad state {state}")))?,
            created_at: Self::millis_to_timestamp(row.try_get("created_at")?)?,
        })
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn get_config(&self) -> StorageResult<Option<MonitorConfig>> {
        let row = sqlx::query(
            r#"
            SELECT alist_url, alist_token, webhook_url, interval_minutes, is_active
            FROM monitor_config
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> StorageResult<MonitorConfig> {
            let interval: i64 = row.try_get("interval_minutes")?;
            Ok(MonitorConfig {
                alist_url: row.try_get("alist_url")?,
                alist_token: row.try_get("alist_token")?,
                webhook_url: row.try_get("webhook_url")?,
                interval: u32::try_from(interval).map_err(|_| {
                    StorageError::SerializationError(format!("bad interval {interval}"))
                })?,
                active: row.try_get("is_active")?,
            })
        })
        .transpose()
    }

    #[instrument(skip_all)]
    async fn save_config(&self, config: MonitorConfig) -> StorageResult<MonitorConfig> {
        sqlx::query(
            r#"
            INSERT INTO monitor_config (id, alist_url, alist_token, webhook_url, interval_minutes, is_active)
            VALUES (1, ?, ?, ?, ?, ?)
            ON CONFLICT (id) DO UPDATE SET
                alist_url = excluded.alist_url,
                alist_token = excluded.alist_token,
                webhook_url = excluded.webhook_url,
                interval_minutes = excluded.interval_minutes,
                is_active = excluded.is_active
            "#,
        )
        .bind(&config.alist_url)
        .bind(&config.alist_token)
        .bind(&config.webhook_url)
        .bind(i64::from(config.interval))
        .bind(config.active)
        .execute(&self.pool)
        .await?;

        debug!("monitor configuration saved");
        Ok(config)
    }

    async fn list_storages(&self) -> StorageResult<Vec<StorageRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, name, mount_path, driver, status, last_check
            FROM storages
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::storage_from_row).collect()
    }

    #[instrument(skip_all, fields(storage = %identity))]
    async fn upsert_storage(
        &self,
        identity: &StorageIdentity,
        fields: StorageFields,
    ) -> StorageResult<StorageRecord> {
        let row = sqlx::query(
            r#"
            INSERT INTO storages (name, mount_path, driver, status, last_check)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (name, mount_path) DO UPDATE SET
                driver = excluded.driver,
                status = excluded.status,
                last_check = excluded.last_check
            RETURNING id
            "#,
        )
        .bind(&identity.name)
        .bind(&identity.mount_path)
        .bind(&fields.driver)
        .bind(fields.status.as_str())
        .bind(Self::timestamp_to_millis(&fields.last_check))
        .fetch_one(&self.pool)
        .await?;

        Ok(StorageRecord {
            id: row.try_get("id")?,
            name: identity.name.clone(),
            mount_path: identity.mount_path.clone(),
            driver: fields.driver,
            status: fields.status,
            last_check: fields.last_check,
        })
    }

    async fn list_notifications(&self) -> StorageResult<Vec<NotificationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, message, kind, delivery_state, created_at
            FROM notifications
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(Self::notification_from_row).collect()
    }

    async fn create_notification(
        &self,
        notification: NewNotification,
    ) -> StorageResult<NotificationRecord> {
        let result = sqlx::query(
            r#"
            INSERT INTO notifications (title, message, kind, delivery_state, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.kind.as_str())
        .bind(notification.delivery_state.as_str())
        .bind(Self::timestamp_to_millis(&notification.created_at))
        .execute(&self.pool)
        .await?;

        Ok(NotificationRecord {
            id: result.last_insert_rowid(),
            title: notification.title,
            message: notification.message,
            kind: notification.kind,
            delivery_state: notification.delivery_state,
            created_at: notification.created_at,
        })
    }

    #[instrument(skip(self))]
    async fn set_notification_state(&self, id: i64, state: DeliveryState) -> StorageResult<()> {
        let current: Option<String> =
            sqlx::query_scalar("SELECT delivery_state FROM notifications WHERE id = ?")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;

        let current = current.ok_or(StorageError::NotificationNotFound(id))?;
        let from = DeliveryState::parse(&current)
            .ok_or_else(|| StorageError::SerializationError(format!("bad state {current}")))?;

        if !from.can_transition_to(state) {
            return Err(StorageError::InvalidTransition { id, from, to: state });
        }

        // Conditional on the state read above so a concurrent writer cannot be overwritten
        let result = sqlx::query(
            "UPDATE notifications SET delivery_state = ? WHERE id = ? AND delivery_state = ?",
        )
        .bind(state.as_str())
        .bind(id)
        .bind(from.as_str())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!("notification {id} changed state concurrently");
            return Err(StorageError::InvalidTransition { id, from, to: state });
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> StorageResult<HealthStatus> {
        match sqlx::query("SELECT 1").fetch_one(&self.pool).await {
            Ok(_) => Ok(HealthStatus {
                healthy: true,
                message: "SQLite store operational".to_string(),
                metadata: HashMap::from([
                    ("backend".to_string(), "sqlite".to_string()),
                    ("db_path".to_string(), self.db_path.clone()),
                ]),
            }),
            Err(e) => {
                warn!("SQLite health check failed: {}", e);
                Ok(HealthStatus {
                    healthy: false,
                    message: format!("SQLite store unhealthy: {e}"),
                    metadata: HashMap::from([("backend".to_string(), "sqlite".to_string())]),
                })
            }
        }
    }

    async fn close(&self) -> StorageResult<()> {
        info!("closing SQLite store");
        self.pool.close().await;
        Ok(())
    }
}
