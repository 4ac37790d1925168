// src/store/queries.rs
use rusqlite::{params, Connection, OptionalExtension, Result};
use tracing::info;

use super::models::{PersistedProperty, PriceHistoryRecord};
use super::BatchOutcome;
use crate::cleaner::CleanListing;
use crate::harvest::types::RawListing;

/// Upsert one listing inside the batch transaction.
pub(super) fn upsert_listing(
    conn: &Connection,
    raw: &RawListing,
    clean: &CleanListing,
    now: &str,
    outcome: &mut BatchOutcome,
) -> Result<()> {
    // Unknown prices persist as 0; `CleanListing` keeps the distinction
    // for analysis, the store only tracks observed movement.
    let price = clean.price.unwrap_or(0) as i64;
    let area = clean.area.map(|a| a as i64);

    let stored: Option<i64> = conn
        .query_row(
            "SELECT current_price FROM property WHERE external_id = ?1",
            params![clean.external_id],
            |row| row.get(0),
        )
        .optional()?;

    match stored {
        None => {
            let raw_json = serde_json::to_string(raw).unwrap_or_default();
            conn.execute(
                "INSERT INTO property (external_id, source, title, location_raw, \
                 category_main, category_sub, current_price, floor_area, \
                 first_seen_at, last_seen_at, raw_data) \
                 VALUES (?1, 'sreality', ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8, ?9)",
                params![
                    clean.external_id,
                    clean.title,
                    clean.locality,
                    clean.category_main,
                    clean.category_sub,
                    price,
                    area,
                    now,
                    raw_json,
                ],
            )?;
            append_history(conn, clean.external_id, price, now)?;
            outcome.new += 1;
        }
        Some(current) => {
            conn.execute(
                "UPDATE property SET title = ?1, location_raw = ?2, last_seen_at = ?3 \
                 WHERE external_id = ?4",
                params![clean.title, clean.locality, now, clean.external_id],
            )?;

            if current != price {
                info!(
                    external_id = clean.external_id,
                    from = current,
                    to = price,
                    "price change detected"
                );
                append_history(conn, clean.external_id, price, now)?;
                conn.execute(
                    "UPDATE property SET current_price = ?1 WHERE external_id = ?2",
                    params![price, clean.external_id],
                )?;
                outcome.price_changed += 1;
            }
            outcome.updated += 1;
        }
    }

    Ok(())
}

fn append_history(conn: &Connection, property_id: i64, price: i64, now: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO price_history (property_id, price, detected_at) VALUES (?1, ?2, ?3)",
        params![property_id, price, now],
    )?;
    Ok(())
}

pub(super) fn find_property(conn: &Connection, external_id: i64) -> Result<Option<PersistedProperty>> {
    conn.query_row(
        "SELECT external_id, source, title, location_raw, category_main, category_sub, \
         current_price, floor_area, first_seen_at, last_seen_at \
         FROM property WHERE external_id = ?1",
        params![external_id],
        |row| {
            Ok(PersistedProperty {
                external_id: row.get(0)?,
                source: row.get(1)?,
                title: row.get(2)?,
                location_raw: row.get(3)?,
                category_main: row.get(4)?,
                category_sub: row.get(5)?,
                current_price: row.get(6)?,
                floor_area: row.get(7)?,
                first_seen_at: row.get(8)?,
                last_seen_at: row.get(9)?,
            })
        },
    )
    .optional()
}

pub(super) fn price_history(conn: &Connection, external_id: i64) -> Result<Vec<PriceHistoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT id, property_id, price, detected_at FROM price_history \
         WHERE property_id = ?1 ORDER BY id ASC",
    )?;
    let rows = stmt
        .query_map(params![external_id], |row| {
            Ok(PriceHistoryRecord {
                id: row.get(0)?,
                property_id: row.get(1)?,
                price: row.get(2)?,
                detected_at: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(rows)
}
