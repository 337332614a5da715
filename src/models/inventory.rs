use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One medicine stock record. Quantity is overwritten whole on edit;
/// the client computes deltas, the data layer keeps no history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItem {
    pub id: Uuid,
    pub medicine_name: String,
    pub quantity: i64,
    pub expiration_date: NaiveDate,
    pub last_updated: DateTime<Utc>,
}
