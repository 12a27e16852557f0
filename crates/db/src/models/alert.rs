use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sysguard_core::types::{DbId, Timestamp};

/// A persisted alert.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Alert {
    pub id: DbId,
    pub recorded_at: Timestamp,
    /// `autofix` or `action_failed`, see `sysguard_core::alert::AlertKind`.
    pub alert_type: String,
    pub message: String,
}

/// DTO for inserting an alert. `recorded_at` is set to now.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateAlert {
    pub alert_type: String,
    pub message: String,
}
