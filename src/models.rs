use std::fmt;

use serde::Serialize;
use time::OffsetDateTime;

/// Measurement streams produced by the physical sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
}

impl Metric {
    /// Every metric a room is queried for, in output order.
    pub const ALL: [Metric; 3] = [Metric::Temperature, Metric::Humidity, Metric::Pressure];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
        }
    }

    /// Table backing this metric's raw reading stream.
    pub fn table(&self) -> &'static str {
        match self {
            Metric::Temperature => "temperatures",
            Metric::Humidity => "humidities",
            Metric::Pressure => "pressures",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque stable identifier of a physical measurement source.
///
/// Distinct from the tag row id: readings reference their source by address,
/// while the CRUD layer links rooms to tags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SensorAddress(String);

impl SensorAddress {
    pub fn new(address: impl Into<String>) -> Self {
        SensorAddress(address.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SensorAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single observation of one metric from one sensor at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Reading {
    pub sensor_address: SensorAddress,
    pub timestamp: OffsetDateTime,
    pub value: f64,
}

/// Sensor identity as recorded by the tag table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagInfo {
    pub id: i32,
    pub name: String,
    pub source_address: SensorAddress,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// One time-bounded room/sensor attachment.
///
/// `end_at` is `None` for an attachment that is still open; the writing side
/// guarantees `end_at > start_at` otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagLink {
    pub id: i32,
    #[serde(skip_serializing)]
    pub room_id: i32,
    pub tag: TagInfo,
    #[serde(with = "time::serde::rfc3339")]
    pub start_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Room attributes as stored by the CRUD layer.
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub floor: Option<i32>,
    pub building_id: Option<i32>,
    pub area: Option<f64>,
    pub capacity: Option<i32>,
    pub start_at: Option<OffsetDateTime>,
    pub end_at: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// One grid sample of a single source.
///
/// `value` is `None` only for a source with no readings at all; once a source
/// has a single reading, edge extension fills every grid point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InterpolatedPoint {
    pub timestamp: OffsetDateTime,
    pub value: Option<f64>,
}

/// Chart point: epoch milliseconds paired with the averaged value.
///
/// Serializes as a two-element JSON array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SeriesPoint(pub i64, pub f64);

/// Per-metric output: summary statistics over the raw values plus the
/// resampled chart series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricSummary {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    #[serde(rename = "nombre_values")]
    pub count: usize,
    #[serde(rename = "data")]
    pub series: Vec<SeriesPoint>,
}

/// One room's full query output.
///
/// A metric key is present only when at least one underlying reading existed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSensorResult {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub floor: Option<i32>,
    pub building_id: Option<i32>,
    pub area: Option<f64>,
    pub capacity: Option<i32>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub start_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub end_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    pub tags: Vec<TagLink>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<MetricSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub humidity: Option<MetricSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<MetricSummary>,
}

impl RoomSensorResult {
    /// Room attributes plus attachment links, with no metric summaries yet.
    pub fn from_parts(room: Room, tags: Vec<TagLink>) -> Self {
        RoomSensorResult {
            id: room.id,
            name: room.name,
            description: room.description,
            floor: room.floor,
            building_id: room.building_id,
            area: room.area,
            capacity: room.capacity,
            start_at: room.start_at,
            end_at: room.end_at,
            created_at: room.created_at,
            updated_at: room.updated_at,
            tags,
            temperature: None,
            humidity: None,
            pressure: None,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, summary: MetricSummary) {
        match metric {
            Metric::Temperature => self.temperature = Some(summary),
            Metric::Humidity => self.humidity = Some(summary),
            Metric::Pressure => self.pressure = Some(summary),
        }
    }
}

/// Batch output: the per-room results plus the count reported alongside.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomBatch {
    pub rooms: Vec<RoomSensorResult>,
    pub total_rooms: usize,
}
