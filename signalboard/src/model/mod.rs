// Record types - one struct per collection, stored as JSON arrays on disk

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account. The username is the collection's key; uniqueness is
/// enforced by a linear scan on insert, not by an index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub password_hash: String,
    pub salt: String,
    pub verification_code: String,
    pub verified: bool,
    pub registered_at: DateTime<Utc>,
}

/// A directory entry with a like counter. Sites are never deleted, so the
/// sequential `id` (collection length + 1 at submission time) stays unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: u64,
    pub name: String,
    pub url: String,
    pub description: String,
    pub likes: u64,
    pub submitted_at: DateTime<Utc>,
}

/// A read-only entry on the signals page. Signals are seeded by hand in
/// `signals.json`; nothing in the app creates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}
