//! Append-only audit log of reporting and administrative actions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded action. Write-only from the core's perspective: events are
/// appended and listed, never edited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
  pub id:          i64,
  /// Label for whoever triggered the action (authentication lives outside
  /// the core).
  pub user:        String,
  pub action:      String,
  pub recorded_at: DateTime<Utc>,
}
