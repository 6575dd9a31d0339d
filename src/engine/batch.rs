/// Batch coordination: fan the metric pipeline out over rooms
use futures_util::future::join_all;
use log::{error, info, warn};
use time::OffsetDateTime;

use crate::engine::attachments::{resolve, sensor_addresses};
use crate::engine::grid::{clamp_interval, DEFAULT_INTERVAL_MINUTES};
use crate::engine::pipeline::run_metric;
use crate::errors::EngineError;
use crate::models::{Metric, Room, RoomBatch, RoomSensorResult, TagLink};
use crate::store::{ReadingStore, RoomStore};

/// Parameters of one batch query.
#[derive(Debug, Clone)]
pub struct RoomQuery {
    /// Restrict the batch to these rooms; `None` queries every room.
    pub room_ids: Option<Vec<i32>>,
    /// Lower bound on reading timestamps, and the reference instant for
    /// attachment activity.
    pub first_value_date: Option<OffsetDateTime>,
    /// Requested grid spacing; clamped into `[1, 1440]` before use.
    pub smooth_interval_minutes: i64,
}

impl Default for RoomQuery {
    fn default() -> Self {
        RoomQuery {
            room_ids: None,
            first_value_date: None,
            smooth_interval_minutes: DEFAULT_INTERVAL_MINUTES,
        }
    }
}

/// Outcome of validating requested room ids against the room store.
///
/// Missing ids are data for the caller to log and drop, not an error.
struct Resolution {
    rooms: Vec<Room>,
    missing: Vec<i32>,
}

/// The resampling engine over its two injected stores.
///
/// Stateless between requests: every `run` call reads the stores afresh and
/// owns all intermediate data for the duration of that call.
pub struct Engine<R, S> {
    rooms: R,
    readings: S,
}

impl<R: RoomStore, S: ReadingStore> Engine<R, S> {
    pub fn new(rooms: R, readings: S) -> Self {
        Engine { rooms, readings }
    }

    /// Run the batch pipeline over the requested rooms.
    ///
    /// Requested ids that do not resolve to a room are dropped with a
    /// warning; the batch proceeds with the rooms that exist. A store
    /// failure aborts the whole batch.
    pub async fn run(&self, query: &RoomQuery) -> Result<RoomBatch, EngineError> {
        let interval = clamp_interval(query.smooth_interval_minutes);

        let Resolution { rooms, missing } =
            self.resolve_rooms(query.room_ids.as_deref()).await?;
        for id in missing {
            warn!("Room {} does not exist, dropping it from the batch", id);
        }

        let room_ids: Vec<i32> = rooms.iter().map(|room| room.id).collect();
        let links = self.rooms.tag_links(&room_ids).await?;
        let mut links_by_room = resolve(links, query.first_value_date);

        // One future per room; each writes only its own result slot.
        let futures = rooms.into_iter().map(|room| {
            let links = links_by_room.remove(&room.id).unwrap_or_default();
            self.room_result(room, links, query.first_value_date, interval)
        });

        let mut results = Vec::new();
        for outcome in join_all(futures).await {
            results.push(outcome?);
        }
        results.sort_by_key(|room| room.id);

        info!(
            "Resampled {} room(s) at a {} minute interval",
            results.len(),
            interval
        );

        Ok(RoomBatch {
            total_rooms: results.len(),
            rooms: results,
        })
    }

    /// Single-room query through the same pipeline.
    ///
    /// Fails with `RoomNotFound` when the room itself does not exist; a room
    /// that exists but has no data succeeds with absent metrics.
    pub async fn run_for_room(
        &self,
        room_id: i32,
        query: &RoomQuery,
    ) -> Result<RoomSensorResult, EngineError> {
        let scoped = RoomQuery {
            room_ids: Some(vec![room_id]),
            ..query.clone()
        };
        let batch = self.run(&scoped).await?;
        batch
            .rooms
            .into_iter()
            .next()
            .ok_or(EngineError::RoomNotFound(room_id))
    }

    /// Validate requested ids against the room store.
    async fn resolve_rooms(&self, ids: Option<&[i32]>) -> Result<Resolution, EngineError> {
        let rooms = self.rooms.rooms_by_ids(ids).await?;
        let missing = match ids {
            Some(requested) => requested
                .iter()
                .copied()
                .filter(|id| !rooms.iter().any(|room| room.id == *id))
                .collect(),
            None => Vec::new(),
        };
        Ok(Resolution { rooms, missing })
    }

    /// Assemble one room's result: attachment links plus the three metric
    /// pipelines over the union of its attached sensors.
    async fn room_result(
        &self,
        room: Room,
        links: Vec<TagLink>,
        since: Option<OffsetDateTime>,
        interval_minutes: i64,
    ) -> Result<RoomSensorResult, EngineError> {
        let addresses = sensor_addresses(&links);
        let mut result = RoomSensorResult::from_parts(room, links);

        let outcomes = join_all(
            Metric::ALL
                .iter()
                .map(|metric| run_metric(&self.readings, *metric, &addresses, since, interval_minutes)),
        )
        .await;

        for (metric, outcome) in Metric::ALL.iter().zip(outcomes) {
            match outcome {
                Ok(Some(summary)) => result.set_metric(*metric, summary),
                Ok(None) => {}
                Err(e) => {
                    error!(
                        "Resampling failed for room {} metric {}: {}",
                        result.id, metric, e
                    );
                    return Err(e);
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use crate::models::{SensorAddress, TagInfo};
    use crate::store::memory::{MemoryReadings, MemoryRooms};

    use super::*;

    fn room(id: i32, name: &str) -> Room {
        Room {
            id,
            name: name.into(),
            description: None,
            floor: Some(1),
            building_id: Some(1),
            area: None,
            capacity: None,
            start_at: None,
            end_at: None,
            created_at: datetime!(2024-01-01 00:00 UTC),
            updated_at: datetime!(2024-01-01 00:00 UTC),
        }
    }

    fn link(
        id: i32,
        room_id: i32,
        address: &str,
        start_at: OffsetDateTime,
        end_at: Option<OffsetDateTime>,
    ) -> TagLink {
        TagLink {
            id,
            room_id,
            tag: TagInfo {
                id: id + 100,
                name: format!("tag-{}", id),
                source_address: SensorAddress::new(address),
                description: None,
                created_at: start_at,
                updated_at: start_at,
            },
            start_at,
            end_at,
            created_at: start_at,
            updated_at: start_at,
        }
    }

    fn engine_with_one_room() -> Engine<MemoryRooms, MemoryReadings> {
        let rooms = MemoryRooms {
            rooms: vec![room(1, "Lab")],
            links: vec![link(1, 1, "A", datetime!(2024-01-01 00:00 UTC), None)],
        };
        let mut readings = MemoryReadings::default();
        readings.push(
            Metric::Temperature,
            "A",
            datetime!(2024-05-01 00:00 UTC),
            20.0,
        );
        readings.push(
            Metric::Temperature,
            "A",
            datetime!(2024-05-01 01:00 UTC),
            24.0,
        );
        Engine::new(rooms, readings)
    }

    #[tokio::test]
    async fn unknown_room_ids_are_dropped_not_fatal() {
        let engine = engine_with_one_room();
        let query = RoomQuery {
            room_ids: Some(vec![1, 9999]),
            ..RoomQuery::default()
        };

        let batch = engine.run(&query).await.unwrap();
        assert_eq!(batch.total_rooms, 1);
        assert_eq!(batch.rooms[0].id, 1);
    }

    #[tokio::test]
    async fn metrics_without_readings_are_omitted() {
        let engine = engine_with_one_room();
        let batch = engine.run(&RoomQuery::default()).await.unwrap();

        let room = &batch.rooms[0];
        assert!(room.temperature.is_some());
        assert!(room.humidity.is_none());
        assert!(room.pressure.is_none());
    }

    #[tokio::test]
    async fn rooms_are_sorted_by_id() {
        let rooms = MemoryRooms {
            rooms: vec![room(3, "C"), room(1, "A"), room(2, "B")],
            links: Vec::new(),
        };
        let engine = Engine::new(rooms, MemoryReadings::default());

        let batch = engine.run(&RoomQuery::default()).await.unwrap();
        let ids: Vec<i32> = batch.rooms.iter().map(|room| room.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(batch.total_rooms, 3);
    }

    #[tokio::test]
    async fn zero_interval_is_treated_as_default() {
        let engine = engine_with_one_room();
        let query = RoomQuery {
            smooth_interval_minutes: 0,
            ..RoomQuery::default()
        };

        let batch = engine.run(&query).await.unwrap();
        let series = &batch.rooms[0].temperature.as_ref().unwrap().series;
        // One hour of data at the 30 minute default: 00:30 and 01:00.
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].0 - series[0].0, 30 * 60 * 1000);
    }

    #[tokio::test]
    async fn oversized_interval_is_capped_at_one_day() {
        let rooms = MemoryRooms {
            rooms: vec![room(1, "Lab")],
            links: vec![link(1, 1, "A", datetime!(2024-01-01 00:00 UTC), None)],
        };
        let mut readings = MemoryReadings::default();
        readings.push(
            Metric::Temperature,
            "A",
            datetime!(2024-05-01 00:00 UTC),
            20.0,
        );
        readings.push(
            Metric::Temperature,
            "A",
            datetime!(2024-05-03 00:00 UTC),
            24.0,
        );
        let engine = Engine::new(rooms, readings);

        let query = RoomQuery {
            smooth_interval_minutes: 5000,
            ..RoomQuery::default()
        };
        let batch = engine.run(&query).await.unwrap();
        let series = &batch.rooms[0].temperature.as_ref().unwrap().series;
        // Two days of data at the capped 1440 minute interval.
        assert_eq!(series.len(), 2);
        assert_eq!(series[1].0 - series[0].0, 1440 * 60 * 1000);
    }

    #[tokio::test]
    async fn attachments_ended_before_reference_are_ignored() {
        let rooms = MemoryRooms {
            rooms: vec![room(1, "Lab")],
            links: vec![
                link(
                    1,
                    1,
                    "OLD",
                    datetime!(2024-01-01 00:00 UTC),
                    Some(datetime!(2024-02-01 00:00 UTC)),
                ),
                link(2, 1, "NEW", datetime!(2024-03-01 00:00 UTC), None),
            ],
        };
        let mut readings = MemoryReadings::default();
        for address in ["OLD", "NEW"] {
            readings.push(
                Metric::Temperature,
                address,
                datetime!(2024-05-01 00:00 UTC),
                if address == "OLD" { 99.0 } else { 20.0 },
            );
            readings.push(
                Metric::Temperature,
                address,
                datetime!(2024-05-01 01:00 UTC),
                if address == "OLD" { 99.0 } else { 24.0 },
            );
        }
        let engine = Engine::new(rooms, readings);

        let query = RoomQuery {
            first_value_date: Some(datetime!(2024-04-01 00:00 UTC)),
            ..RoomQuery::default()
        };
        let batch = engine.run(&query).await.unwrap();

        let room = &batch.rooms[0];
        // Only the active attachment survives; the detached sensor's 99.0
        // readings contribute nothing.
        assert_eq!(room.tags.len(), 1);
        assert_eq!(room.tags[0].id, 2);
        let summary = room.temperature.as_ref().unwrap();
        assert_eq!(summary.max, 24.0);
    }

    #[tokio::test]
    async fn single_room_query_fails_with_not_found() {
        let engine = engine_with_one_room();
        let err = engine
            .run_for_room(42, &RoomQuery::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::RoomNotFound(42)));
    }

    #[tokio::test]
    async fn single_room_without_data_succeeds_with_absent_metrics() {
        let rooms = MemoryRooms {
            rooms: vec![room(5, "Empty")],
            links: Vec::new(),
        };
        let engine = Engine::new(rooms, MemoryReadings::default());

        let result = engine
            .run_for_room(5, &RoomQuery::default())
            .await
            .unwrap();
        assert_eq!(result.id, 5);
        assert!(result.tags.is_empty());
        assert!(result.temperature.is_none());
        assert!(result.humidity.is_none());
        assert!(result.pressure.is_none());
    }

    #[tokio::test]
    async fn identical_inputs_produce_identical_output() {
        let engine = engine_with_one_room();
        let query = RoomQuery::default();

        let first = serde_json::to_value(engine.run(&query).await.unwrap()).unwrap();
        let second = serde_json::to_value(engine.run(&query).await.unwrap()).unwrap();
        assert_eq!(first, second);
    }
}
