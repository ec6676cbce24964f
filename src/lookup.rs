//! Point lookups against the canonical table.
//!
//! Lookups run against whatever `ip_locations` currently holds; a concurrent
//! update run replaces the table between transactions, never inside one, so a
//! lookup sees one complete generation or the other.

use std::net::IpAddr;

use serde_json::{json, Map, Value};
use sqlx::{Row, SqliteConnection};

use crate::config::CANONICAL_TABLE;
use crate::record::ip_key;

/// One canonical-table row matched against a queried address.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch {
    /// ISO 3166-1 alpha-2 country code.
    pub country: String,
    /// City name, if the dataset had one for this range.
    pub city: Option<String>,
    /// Region or state name.
    pub region: Option<String>,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// IANA timezone name.
    pub timezone: Option<String>,
}

impl LocationMatch {
    /// Renders the match as a JSON object, omitting absent fields.
    pub fn to_json(&self, addr: IpAddr) -> Value {
        let mut fields = Map::new();
        fields.insert("ip".into(), json!(addr.to_string()));
        fields.insert("country".into(), json!(self.country));
        if let Some(city) = &self.city {
            fields.insert("city".into(), json!(city));
        }
        if let Some(region) = &self.region {
            fields.insert("region".into(), json!(region));
        }
        if let Some(latitude) = self.latitude {
            fields.insert("latitude".into(), json!(latitude));
        }
        if let Some(longitude) = self.longitude {
            fields.insert("longitude".into(), json!(longitude));
        }
        if let Some(postal_code) = &self.postal_code {
            fields.insert("postal_code".into(), json!(postal_code));
        }
        if let Some(timezone) = &self.timezone {
            fields.insert("timezone".into(), json!(timezone));
        }
        Value::Object(fields)
    }
}

/// Finds the range containing `addr` in the canonical table.
///
/// Returns `Ok(None)` when no range contains the address, and also when the
/// canonical table itself does not exist yet (no update has ever completed).
/// Overlapping ranges resolve to the one with the lowest start address.
pub async fn lookup_ip(
    conn: &mut SqliteConnection,
    addr: IpAddr,
) -> Result<Option<LocationMatch>, sqlx::Error> {
    let key = ip_key(&addr).to_vec();
    let sql = format!(
        "SELECT country, city, region, latitude, longitude, postal_code, timezone \
         FROM {} WHERE ? >= start_ip AND ? <= end_ip ORDER BY start_ip LIMIT 1",
        CANONICAL_TABLE
    );

    let row = match sqlx::query(&sql)
        .bind(key.clone())
        .bind(key)
        .fetch_optional(conn)
        .await
    {
        Ok(row) => row,
        // "no such table" before the first completed update
        Err(sqlx::Error::Database(db)) if db.message().contains("no such table") => return Ok(None),
        Err(err) => return Err(err),
    };

    match row {
        Some(row) => Ok(Some(LocationMatch {
            country: row.try_get("country")?,
            city: row.try_get("city")?,
            region: row.try_get("region")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            postal_code: row.try_get("postal_code")?,
            timezone: row.try_get("timezone")?,
        })),
        None => Ok(None),
    }
}
