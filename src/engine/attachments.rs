/// Room/sensor attachment resolution over time-bounded links
use std::collections::HashMap;

use time::OffsetDateTime;

use crate::models::{SensorAddress, TagLink};

/// Whether an attachment interval contains the reference instant.
///
/// Both bounds are inclusive; an open-ended link is active from its start
/// onwards.
pub fn is_active_at(link: &TagLink, instant: OffsetDateTime) -> bool {
    link.start_at <= instant && link.end_at.map_or(true, |end| end >= instant)
}

/// Group the attachment history by room.
///
/// With a reference instant, only links whose interval contains it are kept;
/// without one, the full history passes through and each link's own bounds
/// provide the interpolation context downstream.
pub fn resolve(links: Vec<TagLink>, at: Option<OffsetDateTime>) -> HashMap<i32, Vec<TagLink>> {
    let mut by_room: HashMap<i32, Vec<TagLink>> = HashMap::new();

    for link in links {
        if let Some(instant) = at {
            if !is_active_at(&link, instant) {
                continue;
            }
        }
        by_room.entry(link.room_id).or_default().push(link);
    }

    by_room
}

/// Deduplicated union of the sensor addresses behind a room's links, in
/// first-seen order.
pub fn sensor_addresses(links: &[TagLink]) -> Vec<SensorAddress> {
    let mut addresses: Vec<SensorAddress> = Vec::new();
    for link in links {
        if !addresses.contains(&link.tag.source_address) {
            addresses.push(link.tag.source_address.clone());
        }
    }
    addresses
}
