//! Dataset rows: parsing, validation, and the address key encoding.
//!
//! The dataset is UTF-8 CSV (comma delimited, double-quote quoted, doubled
//! double-quote escaped). The first row is a header and is discarded; every
//! other row maps positionally onto the ten [`LocationRecord`] fields.
//!
//! Addresses are stored as 16-byte BLOB keys: IPv6 octets as-is, IPv4 as the
//! IPv4-mapped IPv6 octets. SQLite compares BLOBs bytewise, which for this
//! encoding equals numeric address order, so range comparisons in SQL work
//! without a native address type.

use std::net::IpAddr;

use csv::{ReaderBuilder, StringRecord};

use crate::config::{COUNTRY_CODE_LEN, MAX_NAME_LEN, MAX_POSTAL_CODE_LEN, MAX_TIMEZONE_LEN};
use crate::error_handling::UpdateError;

/// Fields per dataset row.
pub const COLUMN_COUNT: usize = 10;

/// One geolocation range: an inclusive span of addresses and the location
/// attributes that apply to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRecord {
    /// First address of the range (inclusive).
    pub start_ip: IpAddr,
    /// Last address of the range (inclusive).
    pub end_ip: IpAddr,
    /// Network address, when the dataset carries one.
    pub network_ip: Option<IpAddr>,
    /// City name.
    pub city: Option<String>,
    /// Region or subdivision name.
    pub region: Option<String>,
    /// Two-letter country code.
    pub country: String,
    /// Latitude in decimal degrees.
    pub latitude: Option<f64>,
    /// Longitude in decimal degrees.
    pub longitude: Option<f64>,
    /// Postal code.
    pub postal_code: Option<String>,
    /// IANA timezone name.
    pub timezone: Option<String>,
}

/// Encodes an address as its 16-byte storage key.
///
/// Bytewise key order equals numeric address order, with the whole IPv4 space
/// sitting inside the IPv4-mapped IPv6 block.
pub fn ip_key(addr: &IpAddr) -> [u8; 16] {
    match addr {
        IpAddr::V4(v4) => v4.to_ipv6_mapped().octets(),
        IpAddr::V6(v6) => v6.octets(),
    }
}

/// Decodes a 16-byte storage key back into an address.
///
/// Keys in the IPv4-mapped block come back as IPv4. Returns `None` when
/// `key` is not exactly 16 bytes.
pub fn key_to_ip(key: &[u8]) -> Option<IpAddr> {
    let octets: [u8; 16] = key.try_into().ok()?;
    let v6 = std::net::Ipv6Addr::from(octets);
    Some(match v6.to_ipv4_mapped() {
        Some(v4) => IpAddr::V4(v4),
        None => IpAddr::V6(v6),
    })
}

/// Parses the raw dataset text into validated records.
///
/// The header row is discarded. Errors name the 1-based data row that failed;
/// no partial result is returned.
pub fn parse_dataset(raw: &str) -> Result<Vec<LocationRecord>, UpdateError> {
    // flexible() defers field-count checking to parse_record, which reports
    // the row number with the error
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .from_reader(raw.as_bytes());

    let mut records = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let row = index + 1;
        let fields = result.map_err(|e| UpdateError::row(row, e))?;
        records.push(parse_record(&fields, row)?);
    }
    Ok(records)
}

/// Validates one positional row. `row` is the 1-based data row for error
/// attribution.
fn parse_record(fields: &StringRecord, row: usize) -> Result<LocationRecord, UpdateError> {
    if fields.len() != COLUMN_COUNT {
        return Err(UpdateError::row(
            row,
            format!("expected {} fields, found {}", COLUMN_COUNT, fields.len()),
        ));
    }
    let field = |i: usize| fields.get(i).unwrap_or("");

    Ok(LocationRecord {
        start_ip: required_ip(field(0), "start_ip", row)?,
        end_ip: required_ip(field(1), "end_ip", row)?,
        network_ip: optional_ip(field(2), "network_ip", row)?,
        city: optional_text(field(3), "city", MAX_NAME_LEN, row)?,
        region: optional_text(field(4), "region", MAX_NAME_LEN, row)?,
        country: country(field(5), row)?,
        latitude: optional_float(field(6), "latitude", row)?,
        longitude: optional_float(field(7), "longitude", row)?,
        postal_code: optional_text(field(8), "postal_code", MAX_POSTAL_CODE_LEN, row)?,
        timezone: optional_text(field(9), "timezone", MAX_TIMEZONE_LEN, row)?,
    })
}

fn required_ip(field: &str, column: &str, row: usize) -> Result<IpAddr, UpdateError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Err(UpdateError::row(row, format!("{} is required", column)));
    }
    trimmed
        .parse()
        .map_err(|e| UpdateError::row(row, format!("invalid {}: {}", column, e)))
}

fn optional_ip(field: &str, column: &str, row: usize) -> Result<Option<IpAddr>, UpdateError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| UpdateError::row(row, format!("invalid {}: {}", column, e)))
}

fn optional_float(field: &str, column: &str, row: usize) -> Result<Option<f64>, UpdateError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse()
        .map(Some)
        .map_err(|e| UpdateError::row(row, format!("invalid {}: {}", column, e)))
}

fn country(field: &str, row: usize) -> Result<String, UpdateError> {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Err(UpdateError::row(row, "country is required"));
    }
    if trimmed.chars().count() != COUNTRY_CODE_LEN {
        return Err(UpdateError::row(
            row,
            format!("country must be exactly {} characters", COUNTRY_CODE_LEN),
        ));
    }
    Ok(trimmed.to_string())
}

fn optional_text(
    field: &str,
    column: &str,
    max: usize,
    row: usize,
) -> Result<Option<String>, UpdateError> {
    if field.is_empty() {
        return Ok(None);
    }
    if field.chars().count() > max {
        return Err(UpdateError::row(
            row,
            format!("{} longer than {} characters", column, max),
        ));
    }
    Ok(Some(field.to_string()))
}
