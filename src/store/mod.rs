pub mod connection;
pub mod readings;
pub mod rooms;

#[cfg(test)]
pub mod memory;

use time::OffsetDateTime;

use crate::errors::StoreError;
use crate::models::{Metric, Reading, Room, SensorAddress, TagLink};

pub use connection::connect;
pub use readings::PgReadingStore;
pub use rooms::PgRoomStore;

/// Room and attachment lookups consumed by the batch coordinator.
pub trait RoomStore {
    /// Rooms matching `ids`; `None` fetches every room. Ids that resolve to
    /// nothing are simply absent from the result, not an error.
    async fn rooms_by_ids(&self, ids: Option<&[i32]>) -> Result<Vec<Room>, StoreError>;

    /// Full attachment history for the given rooms, joined with sensor
    /// identity.
    async fn tag_links(&self, room_ids: &[i32]) -> Result<Vec<TagLink>, StoreError>;
}

/// Raw reading retrieval, one logical stream per metric.
pub trait ReadingStore {
    /// Readings for `addresses`, timestamp ascending, optionally bounded
    /// below by `since`.
    async fn fetch(
        &self,
        metric: Metric,
        addresses: &[SensorAddress],
        since: Option<OffsetDateTime>,
    ) -> Result<Vec<Reading>, StoreError>;
}
