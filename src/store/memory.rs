/// In-memory store doubles for pipeline and coordinator tests
use std::collections::HashMap;

use time::OffsetDateTime;

use crate::errors::StoreError;
use crate::models::{Metric, Reading, Room, SensorAddress, TagLink};
use crate::store::{ReadingStore, RoomStore};

/// Vec-backed room/attachment store. Returns rooms in insertion order so
/// the coordinator's own sorting is exercised.
#[derive(Debug, Default)]
pub struct MemoryRooms {
    pub rooms: Vec<Room>,
    pub links: Vec<TagLink>,
}

impl RoomStore for MemoryRooms {
    async fn rooms_by_ids(&self, ids: Option<&[i32]>) -> Result<Vec<Room>, StoreError> {
        Ok(match ids {
            Some(ids) => self
                .rooms
                .iter()
                .filter(|room| ids.contains(&room.id))
                .cloned()
                .collect(),
            None => self.rooms.clone(),
        })
    }

    async fn tag_links(&self, room_ids: &[i32]) -> Result<Vec<TagLink>, StoreError> {
        Ok(self
            .links
            .iter()
            .filter(|link| room_ids.contains(&link.room_id))
            .cloned()
            .collect())
    }
}

/// Per-metric reading fixtures with the ordering/filter semantics of the
/// real store.
#[derive(Debug, Default)]
pub struct MemoryReadings {
    pub readings: HashMap<Metric, Vec<Reading>>,
}

impl MemoryReadings {
    pub fn push(&mut self, metric: Metric, address: &str, timestamp: OffsetDateTime, value: f64) {
        self.readings.entry(metric).or_default().push(Reading {
            sensor_address: SensorAddress::new(address),
            timestamp,
            value,
        });
    }
}

impl ReadingStore for MemoryReadings {
    async fn fetch(
        &self,
        metric: Metric,
        addresses: &[SensorAddress],
        since: Option<OffsetDateTime>,
    ) -> Result<Vec<Reading>, StoreError> {
        let mut readings: Vec<Reading> = self
            .readings
            .get(&metric)
            .map(|readings| {
                readings
                    .iter()
                    .filter(|reading| addresses.contains(&reading.sensor_address))
                    .filter(|reading| since.map_or(true, |since| reading.timestamp >= since))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        readings.sort_by_key(|reading| reading.timestamp);
        Ok(readings)
    }
}
