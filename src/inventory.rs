//! Inventory quantity edits and the pure stock/expiration classifiers
//! shared by the inventory views and analytics.

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::db::{repository, DatabaseError};
use crate::models::enums::{ExpiryStatus, StockLevel};
use crate::models::InventoryItem;

/// Days ahead of expiry at which a medicine counts as "Expiring Soon".
pub const EXPIRY_WINDOW_DAYS: i64 = 30;

const STOCK_CRITICAL_BELOW: i64 = 10;
const STOCK_LOW_BELOW: i64 = 30;

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("Quantity cannot be negative")]
    NegativeQuantity,
    #[error("Medicine not found")]
    ItemNotFound,
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for InventoryError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { .. } => InventoryError::ItemNotFound,
            other => InventoryError::Database(other),
        }
    }
}

/// Overwrite an item's quantity. Negative input fails before any write;
/// success refreshes `last_updated`.
pub fn adjust_quantity(
    conn: &Connection,
    item_id: &Uuid,
    new_quantity: i64,
) -> Result<InventoryItem, InventoryError> {
    if new_quantity < 0 {
        return Err(InventoryError::NegativeQuantity);
    }
    let item = repository::set_quantity(conn, item_id, new_quantity, Utc::now())?;
    Ok(item)
}

/// Stock-threshold classification: a pure function of quantity.
pub fn classify_stock(quantity: i64) -> StockLevel {
    if quantity < STOCK_CRITICAL_BELOW {
        StockLevel::Critical
    } else if quantity < STOCK_LOW_BELOW {
        StockLevel::Low
    } else {
        StockLevel::Adequate
    }
}

/// Expiration classification relative to `today`.
pub fn classify_expiry(expiration_date: NaiveDate, today: NaiveDate) -> ExpiryStatus {
    if expiration_date < today {
        ExpiryStatus::Expired
    } else if expiration_date <= today + chrono::Duration::days(EXPIRY_WINDOW_DAYS) {
        ExpiryStatus::ExpiringSoon
    } else {
        ExpiryStatus::Valid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_memory_database;

    fn seeded_item(conn: &Connection, quantity: i64) -> InventoryItem {
        let item = InventoryItem {
            id: Uuid::new_v4(),
            medicine_name: "Paracetamol".into(),
            quantity,
            expiration_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            last_updated: Utc::now(),
        };
        repository::insert_item(conn, &item).unwrap();
        item
    }

    #[test]
    fn negative_quantity_rejected_without_write() {
        let conn = open_memory_database().unwrap();
        for prior in [0, 1, 5, 250] {
            let item = seeded_item(&conn, prior);
            let result = adjust_quantity(&conn, &item.id, -1);
            assert!(matches!(result, Err(InventoryError::NegativeQuantity)));

            let stored = repository::get_item(&conn, &item.id).unwrap().unwrap();
            assert_eq!(stored.quantity, prior, "quantity must be unchanged");
        }
    }

    #[test]
    fn adjust_overwrites_quantity() {
        let conn = open_memory_database().unwrap();
        let item = seeded_item(&conn, 5);

        assert_eq!(classify_stock(item.quantity), StockLevel::Critical);
        let updated = adjust_quantity(&conn, &item.id, 35).unwrap();
        assert_eq!(updated.quantity, 35);
        assert_eq!(classify_stock(updated.quantity), StockLevel::Adequate);
    }

    #[test]
    fn adjust_unknown_item_reports_not_found() {
        let conn = open_memory_database().unwrap();
        let result = adjust_quantity(&conn, &Uuid::new_v4(), 10);
        assert!(matches!(result, Err(InventoryError::ItemNotFound)));
    }

    #[test]
    fn stock_thresholds() {
        assert_eq!(classify_stock(0), StockLevel::Critical);
        assert_eq!(classify_stock(9), StockLevel::Critical);
        assert_eq!(classify_stock(10), StockLevel::Low);
        assert_eq!(classify_stock(29), StockLevel::Low);
        assert_eq!(classify_stock(30), StockLevel::Adequate);
        assert_eq!(classify_stock(500), StockLevel::Adequate);
    }

    #[test]
    fn expiry_classification_boundaries() {
        let today = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let yesterday = today - chrono::Duration::days(1);
        let in_window = today + chrono::Duration::days(30);
        let beyond = today + chrono::Duration::days(31);

        assert_eq!(classify_expiry(yesterday, today), ExpiryStatus::Expired);
        assert_eq!(classify_expiry(today, today), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify_expiry(in_window, today), ExpiryStatus::ExpiringSoon);
        assert_eq!(classify_expiry(beyond, today), ExpiryStatus::Valid);
    }
}
