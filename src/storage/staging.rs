//! Staged dataset loading.
//!
//! Builds a fully-formed replacement table off to the side, inside a single
//! all-or-nothing transaction: parse and validate every row, drop whatever a
//! crashed run left under the staging name, create the staging table, bulk
//! insert, index, commit. A failure at any step rolls the whole thing back
//! and the canonical table never notices.

use log::{info, warn};
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};

use crate::config::{CANONICAL_TABLE, INSERT_BATCH_SIZE, STAGING_TABLE};
use crate::error_handling::UpdateError;
use crate::record::{ip_key, parse_dataset, LocationRecord};

use super::schema;

/// Proof that a staging table was built and committed, consumed by
/// [`promote`](super::promote).
#[derive(Debug)]
pub struct StagingHandle {
    pub(crate) rows: usize,
    pub(crate) bootstrap: bool,
    pub(crate) generation: String,
}

impl StagingHandle {
    /// Data rows loaded into staging.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// True when this load created the canonical table for the first time.
    pub fn bootstrap(&self) -> bool {
        self.bootstrap
    }
}

/// Parses `raw_text` and builds the staging table in one transaction.
///
/// On first run the canonical table is also created here, fully formed, so a
/// reader never observes it missing or half-built. Staging debris from a
/// prior crashed run is dropped and rebuilt, never reused. Any row that
/// fails validation or violates a table constraint aborts the transaction
/// with the offending row named in the error.
pub async fn load_staging(
    conn: &mut SqliteConnection,
    raw_text: &str,
) -> Result<StagingHandle, UpdateError> {
    let records = parse_dataset(raw_text)?;
    if records.is_empty() {
        warn!("Dataset has no data rows; staging an empty table");
    }

    let generation = schema::next_generation();
    let mut tx = conn.begin().await.map_err(UpdateError::data)?;

    let bootstrap = !schema::table_exists(&mut tx, CANONICAL_TABLE)
        .await
        .map_err(UpdateError::data)?;
    if bootstrap {
        info!("Canonical table {} missing; creating it", CANONICAL_TABLE);
        schema::create_table_with_indexes(&mut tx, CANONICAL_TABLE, &generation)
            .await
            .map_err(UpdateError::data)?;
    }

    schema::drop_table_if_exists(&mut tx, STAGING_TABLE)
        .await
        .map_err(UpdateError::data)?;
    schema::create_table(&mut tx, STAGING_TABLE)
        .await
        .map_err(UpdateError::data)?;

    insert_records(&mut tx, &records).await?;

    // Indexes go on after the bulk insert
    schema::create_indexes(&mut tx, STAGING_TABLE, &generation)
        .await
        .map_err(UpdateError::data)?;

    tx.commit().await.map_err(UpdateError::data)?;
    info!("Staged {} rows into {}", records.len(), STAGING_TABLE);

    Ok(StagingHandle {
        rows: records.len(),
        bootstrap,
        generation,
    })
}

async fn insert_records(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    records: &[LocationRecord],
) -> Result<(), UpdateError> {
    for (batch_index, batch) in records.chunks(INSERT_BATCH_SIZE).enumerate() {
        if insert_batch(tx, batch).await.is_ok() {
            continue;
        }

        // The failed INSERT aborted only its own statement, so the batch can
        // be replayed one row at a time to name the offender
        let first_row = batch_index * INSERT_BATCH_SIZE + 1;
        for (offset, record) in batch.iter().enumerate() {
            insert_batch(tx, std::slice::from_ref(record))
                .await
                .map_err(|e| UpdateError::row(first_row + offset, e))?;
        }
    }
    Ok(())
}

async fn insert_batch(
    tx: &mut sqlx::Transaction<'_, Sqlite>,
    batch: &[LocationRecord],
) -> Result<(), sqlx::Error> {
    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
        "INSERT INTO {} (start_ip, end_ip, network_ip, city, region, country, \
         latitude, longitude, postal_code, timezone) ",
        STAGING_TABLE
    ));
    builder.push_values(batch, |mut b, record| {
        b.push_bind(ip_key(&record.start_ip).to_vec())
            .push_bind(ip_key(&record.end_ip).to_vec())
            .push_bind(record.network_ip.as_ref().map(|ip| ip_key(ip).to_vec()))
            .push_bind(record.city.as_deref())
            .push_bind(record.region.as_deref())
            .push_bind(record.country.as_str())
            .push_bind(record.latitude)
            .push_bind(record.longitude)
            .push_bind(record.postal_code.as_deref())
            .push_bind(record.timezone.as_deref());
    });

    builder.build().execute(&mut **tx).await?;
    Ok(())
}
