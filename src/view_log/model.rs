use mongodb::bson::{DateTime, oid::ObjectId};
use serde::{Deserialize, Serialize};

/// One raw view event. Hot-post scores are derived from these.
#[derive(Debug, Serialize, Deserialize)]
pub struct ViewLogEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub post_id: ObjectId,
    pub viewed_at: DateTime,
}

#[derive(Debug, Clone, Copy)]
pub struct HotScore {
    pub post_id: ObjectId,
    pub score: i64,
}
