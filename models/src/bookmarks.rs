// models/src/bookmarks.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identifiers::NetId;

/// A user's saved ride. At most one bookmark exists per `(net_id, ride_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub net_id: NetId,
    pub ride_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(net_id: NetId, ride_id: Uuid) -> Self {
        Bookmark {
            net_id,
            ride_id,
            created_at: Utc::now(),
        }
    }
}
