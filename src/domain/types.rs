//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Review state of an enrollment's certificate (mirrors Postgres enum
/// `certificate_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "certificate_status", rename_all = "snake_case")]
pub enum CertificateStatus {
    Pending,
    Approved,
}
