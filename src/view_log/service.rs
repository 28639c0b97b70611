use crate::database::DB_NAME;
use crate::utils::error::ApiError;
use crate::view_log::model::{HotScore, ViewLogEntry};
use futures_util::TryStreamExt;
use mongodb::bson::{Bson, DateTime, Document, doc, oid::ObjectId};
use mongodb::{Client, Collection};

/// Views older than this fall out of the ranking entirely
const HOT_WINDOW_HOURS: i64 = 168;

/// Recency tiers: a view younger than the bound earns the tier's weight.
/// Anything inside the window but past the last tier earns the base weight.
const HOT_TIERS: [(i64, i32); 2] = [(24, 3), (72, 2)];
const HOT_BASE_WEIGHT: i32 = 1;

/// Size of the hot-posts slice
pub const HOT_LIMIT: i64 = 3;

/// Weight of a view `age_hours` old; `None` once it leaves the window
pub fn recency_weight(age_hours: i64) -> Option<i32> {
    if age_hours >= HOT_WINDOW_HOURS {
        return None;
    }
    for (bound, weight) in HOT_TIERS {
        if age_hours < bound {
            return Some(weight);
        }
    }
    Some(HOT_BASE_WEIGHT)
}

fn hours_before(now: DateTime, hours: i64) -> DateTime {
    DateTime::from_millis(now.timestamp_millis() - hours * 3_600_000)
}

/// Aggregation over the view log: window, tier weights, per-post sum,
/// descending sort, fixed-size slice.
fn hot_pipeline(now: DateTime) -> Vec<Document> {
    let branches: Vec<Bson> = HOT_TIERS
        .iter()
        .map(|(bound, weight)| {
            Bson::Document(doc! {
                "case": { "$gte": [ "$viewed_at", hours_before(now, *bound) ] },
                "then": *weight,
            })
        })
        .collect();

    vec![
        doc! { "$match": { "viewed_at": { "$gte": hours_before(now, HOT_WINDOW_HOURS) } } },
        doc! { "$project": {
            "post_id": 1,
            "weight": { "$switch": { "branches": branches, "default": HOT_BASE_WEIGHT } },
        } },
        doc! { "$group": { "_id": "$post_id", "score": { "$sum": "$weight" } } },
        doc! { "$sort": { "score": -1 } },
        doc! { "$limit": HOT_LIMIT },
    ]
}

fn score_as_i64(value: Option<&Bson>) -> i64 {
    match value {
        Some(Bson::Int32(n)) => i64::from(*n),
        Some(Bson::Int64(n)) => *n,
        Some(Bson::Double(n)) => *n as i64,
        _ => 0,
    }
}

pub struct ViewLogService {
    collection: Collection<ViewLogEntry>,
}

impl ViewLogService {
    pub fn new(client: &Client) -> Self {
        let collection = client
            .database(DB_NAME)
            .collection::<ViewLogEntry>("view_log");
        ViewLogService { collection }
    }

    pub async fn record_view(&self, post_id: ObjectId) -> Result<(), ApiError> {
        let entry = ViewLogEntry {
            id: None,
            post_id,
            viewed_at: DateTime::now(),
        };

        self.collection
            .insert_one(entry)
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Failed to record view: {}", e)))?;

        Ok(())
    }

    /// Top posts by summed recency weight, best first
    pub async fn hot_posts(&self) -> Result<Vec<HotScore>, ApiError> {
        let mut cursor = self
            .collection
            .aggregate(hot_pipeline(DateTime::now()))
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Failed to rank posts: {}", e)))?;

        let mut scores = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| ApiError::InternalServerError(format!("Failed to rank posts: {}", e)))?
        {
            let post_id = match doc.get_object_id("_id") {
                Ok(id) => id,
                Err(_) => continue,
            };
            scores.push(HotScore {
                post_id,
                score: score_as_i64(doc.get("score")),
            });
        }

        Ok(scores)
    }

    pub async fn delete_for_post(&self, post_id: &ObjectId) -> Result<u64, ApiError> {
        let result = self
            .collection
            .delete_many(doc! { "post_id": post_id })
            .await
            .map_err(|e| {
                ApiError::InternalServerError(format!("Failed to delete view log: {}", e))
            })?;

        Ok(result.deleted_count)
    }
}

#[cfg(test)]
mod tests {
    use super::{HOT_LIMIT, hot_pipeline, recency_weight, score_as_i64};
    use mongodb::bson::{Bson, DateTime};

    #[test]
    fn weights_follow_recency_tiers() {
        assert_eq!(recency_weight(0), Some(3));
        assert_eq!(recency_weight(23), Some(3));
        assert_eq!(recency_weight(24), Some(2));
        assert_eq!(recency_weight(71), Some(2));
        assert_eq!(recency_weight(72), Some(1));
        assert_eq!(recency_weight(167), Some(1));
        assert_eq!(recency_weight(168), None);
        assert_eq!(recency_weight(1000), None);
    }

    #[test]
    fn pipeline_windows_groups_and_limits() {
        let now = DateTime::from_millis(1_700_000_000_000);
        let pipeline = hot_pipeline(now);

        assert_eq!(pipeline.len(), 5);

        let cutoff = pipeline[0]
            .get_document("$match")
            .unwrap()
            .get_document("viewed_at")
            .unwrap()
            .get_datetime("$gte")
            .unwrap();
        assert_eq!(
            cutoff.timestamp_millis(),
            now.timestamp_millis() - 168 * 3_600_000
        );

        let group = pipeline[2].get_document("$group").unwrap();
        assert_eq!(group.get_str("_id").unwrap(), "$post_id");

        assert_eq!(pipeline[4].get_i64("$limit").unwrap(), HOT_LIMIT);
    }

    #[test]
    fn scores_read_from_any_numeric_bson() {
        assert_eq!(score_as_i64(Some(&Bson::Int32(7))), 7);
        assert_eq!(score_as_i64(Some(&Bson::Int64(9))), 9);
        assert_eq!(score_as_i64(Some(&Bson::Double(4.0))), 4);
        assert_eq!(score_as_i64(None), 0);
    }
}
