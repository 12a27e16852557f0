//! Repository for the `alerts` table (append-only).

use chrono::Utc;
use sqlx::SqlitePool;
use sysguard_core::alert::AlertKind;
use sysguard_core::autofix::TriggeredAction;

use crate::models::alert::{Alert, CreateAlert};

const COLUMNS: &str = "id, recorded_at, alert_type, message";

pub struct AlertRepo;

impl AlertRepo {
    /// Insert an alert stamped with the current time.
    pub async fn insert(pool: &SqlitePool, input: &CreateAlert) -> Result<Alert, sqlx::Error> {
        let query = format!(
            "INSERT INTO alerts (recorded_at, alert_type, message) \
             VALUES (?, ?, ?) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Alert>(&query)
            .bind(Utc::now())
            .bind(&input.alert_type)
            .bind(&input.message)
            .fetch_one(pool)
            .await
    }

    /// One row per triggered rule, in order. A failed insert is logged and
    /// the remaining rows are still written; the actions behind them have
    /// already run. Returns the number of rows written.
    pub async fn record_triggered(pool: &SqlitePool, triggered: &[TriggeredAction]) -> usize {
        let mut written = 0;
        for t in triggered {
            let alert = CreateAlert {
                alert_type: AlertKind::for_triggered(t).as_str().to_string(),
                message: t.description(),
            };
            match Self::insert(pool, &alert).await {
                Ok(_) => written += 1,
                Err(e) => tracing::error!(error = %e, rule = %t.rule_name, "Failed to persist alert"),
            }
        }
        written
    }

    /// Most recent alerts first.
    pub async fn list_recent(pool: &SqlitePool, limit: i64) -> Result<Vec<Alert>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM alerts ORDER BY id DESC LIMIT ?");
        sqlx::query_as::<_, Alert>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
