/// Room and attachment queries backing the batch coordinator
use std::sync::Arc;

use tokio_postgres::{Client, Row};

use crate::errors::StoreError;
use crate::models::{Room, SensorAddress, TagInfo, TagLink};
use crate::store::RoomStore;

const ROOM_COLUMNS: &str = "id, name, description, floor, building_id, area, capacity, \
                            start_at, end_at, created_at, updated_at";

/// Read-only room/attachment store over a shared PostgreSQL client.
#[derive(Clone)]
pub struct PgRoomStore {
    client: Arc<Client>,
}

impl PgRoomStore {
    pub fn new(client: Arc<Client>) -> Self {
        PgRoomStore { client }
    }
}

fn room_from_row(row: &Row) -> Result<Room, StoreError> {
    Ok(Room {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        floor: row.try_get("floor")?,
        building_id: row.try_get("building_id")?,
        area: row.try_get("area")?,
        capacity: row.try_get("capacity")?,
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn link_from_row(row: &Row) -> Result<TagLink, StoreError> {
    let source_address: String = row.try_get("source_address")?;
    Ok(TagLink {
        id: row.try_get("id")?,
        room_id: row.try_get("room_id")?,
        tag: TagInfo {
            id: row.try_get("tag_id")?,
            name: row.try_get("tag_name")?,
            source_address: SensorAddress::new(source_address),
            description: row.try_get("tag_description")?,
            created_at: row.try_get("tag_created_at")?,
            updated_at: row.try_get("tag_updated_at")?,
        },
        start_at: row.try_get("start_at")?,
        end_at: row.try_get("end_at")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

impl RoomStore for PgRoomStore {
    async fn rooms_by_ids(&self, ids: Option<&[i32]>) -> Result<Vec<Room>, StoreError> {
        let rows = match ids {
            Some(ids) => {
                let sql = format!(
                    "SELECT {} FROM rooms WHERE id = ANY($1) ORDER BY id",
                    ROOM_COLUMNS
                );
                self.client.query(&sql, &[&ids]).await?
            }
            None => {
                let sql = format!("SELECT {} FROM rooms ORDER BY id", ROOM_COLUMNS);
                self.client.query(&sql, &[]).await?
            }
        };

        rows.iter().map(room_from_row).collect()
    }

    async fn tag_links(&self, room_ids: &[i32]) -> Result<Vec<TagLink>, StoreError> {
        let rows = self
            .client
            .query(
                "SELECT rt.id, rt.room_id, rt.start_at, rt.end_at, rt.created_at, rt.updated_at, \
                        t.id AS tag_id, t.name AS tag_name, t.source_address, \
                        t.description AS tag_description, \
                        t.created_at AS tag_created_at, t.updated_at AS tag_updated_at \
                 FROM room_tags rt \
                 JOIN tags t ON t.id = rt.tag_id \
                 WHERE rt.room_id = ANY($1) \
                 ORDER BY rt.room_id, rt.start_at",
                &[&room_ids],
            )
            .await?;

        rows.iter().map(link_from_row).collect()
    }
}
