use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use super::user::{parse_date, parse_timestamp, parse_uuid};
use crate::db::DatabaseError;
use crate::models::InventoryItem;

pub fn insert_item(conn: &Connection, item: &InventoryItem) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO inventory (id, medicine_name, quantity, expiration_date, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.id.to_string(),
            item.medicine_name,
            item.quantity,
            item.expiration_date.to_string(),
            item.last_updated.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_item(conn: &Connection, id: &Uuid) -> Result<Option<InventoryItem>, DatabaseError> {
    conn.query_row(
        "SELECT id, medicine_name, quantity, expiration_date, last_updated
         FROM inventory WHERE id = ?1",
        params![id.to_string()],
        item_from_row,
    )
    .optional()?
    .map(item_from_parts)
    .transpose()
}

pub fn list_items(conn: &Connection) -> Result<Vec<InventoryItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, medicine_name, quantity, expiration_date, last_updated
         FROM inventory ORDER BY medicine_name",
    )?;

    let rows = stmt.query_map([], item_from_row)?;

    let mut items = Vec::new();
    for row in rows {
        items.push(item_from_parts(row?)?);
    }
    Ok(items)
}

/// Overwrite the quantity whole (the data layer keeps no delta history).
/// Returns the refreshed record.
pub fn set_quantity(
    conn: &Connection,
    id: &Uuid,
    quantity: i64,
    updated_at: DateTime<Utc>,
) -> Result<InventoryItem, DatabaseError> {
    let affected = conn.execute(
        "UPDATE inventory SET quantity = ?2, last_updated = ?3 WHERE id = ?1",
        params![id.to_string(), quantity, updated_at.to_rfc3339()],
    )?;
    if affected == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "InventoryItem".into(),
            id: id.to_string(),
        });
    }
    get_item(conn, id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "InventoryItem".into(),
        id: id.to_string(),
    })
}

/// Unconditional delete; nothing references inventory.
pub fn delete_item(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "DELETE FROM inventory WHERE id = ?1",
        params![id.to_string()],
    )?;
    Ok(())
}

pub fn count_items(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM inventory", [], |row| row.get(0))?;
    Ok(count)
}

type ItemRow = (String, String, i64, String, String);

fn item_from_row(row: &rusqlite::Row<'_>) -> Result<ItemRow, rusqlite::Error> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
    ))
}

fn item_from_parts(row: ItemRow) -> Result<InventoryItem, DatabaseError> {
    let (id, medicine_name, quantity, expiration_date, last_updated) = row;
    Ok(InventoryItem {
        id: parse_uuid(&id)?,
        medicine_name,
        quantity,
        expiration_date: parse_date(&expiration_date)?,
        last_updated: parse_timestamp(&last_updated)?,
    })
}
