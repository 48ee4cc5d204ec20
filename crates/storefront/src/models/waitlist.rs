//! Pre-launch waitlist signups.

use chrono::{DateTime, Utc};
use serde::Serialize;

use lucid_core::{Email, WaitlistEntryId};

/// One signup. Entries are append-only and unique by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistEntry {
    pub id: WaitlistEntryId,
    pub email: Email,
    pub name: String,
    pub joined_at: DateTime<Utc>,
}
