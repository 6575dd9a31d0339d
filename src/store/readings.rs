/// Raw reading queries, one table per metric stream
use std::sync::Arc;

use time::OffsetDateTime;
use tokio_postgres::{Client, Row};

use crate::errors::StoreError;
use crate::models::{Metric, Reading, SensorAddress};
use crate::store::ReadingStore;

/// Read-only reading store over a shared PostgreSQL client.
#[derive(Clone)]
pub struct PgReadingStore {
    client: Arc<Client>,
}

impl PgReadingStore {
    pub fn new(client: Arc<Client>) -> Self {
        PgReadingStore { client }
    }
}

fn reading_from_row(row: &Row) -> Result<Reading, StoreError> {
    let sensor_address: String = row.try_get("sensor_address")?;
    Ok(Reading {
        sensor_address: SensorAddress::new(sensor_address),
        timestamp: row.try_get("created_at")?,
        value: row.try_get("value")?,
    })
}

impl ReadingStore for PgReadingStore {
    async fn fetch(
        &self,
        metric: Metric,
        addresses: &[SensorAddress],
        since: Option<OffsetDateTime>,
    ) -> Result<Vec<Reading>, StoreError> {
        if addresses.is_empty() {
            return Ok(Vec::new());
        }

        let addresses: Vec<&str> = addresses.iter().map(SensorAddress::as_str).collect();
        let rows = match since {
            Some(since) => {
                let sql = format!(
                    "SELECT sensor_address, value, created_at FROM {} \
                     WHERE sensor_address = ANY($1) AND created_at >= $2 \
                     ORDER BY created_at",
                    metric.table()
                );
                self.client.query(&sql, &[&addresses, &since]).await?
            }
            None => {
                let sql = format!(
                    "SELECT sensor_address, value, created_at FROM {} \
                     WHERE sensor_address = ANY($1) \
                     ORDER BY created_at",
                    metric.table()
                );
                self.client.query(&sql, &[&addresses]).await?
            }
        };

        rows.iter().map(reading_from_row).collect()
    }
}
