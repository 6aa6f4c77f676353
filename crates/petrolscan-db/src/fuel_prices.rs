//! Database operations for the `fuel_price_records` table.

use chrono::{DateTime, Utc};
use petrolscan_core::{
    FuelPriceStore, FuelQuality, FuelType, IdentityKey, NewFuelPriceRecord, RecordFields,
    StoreError, StoredRecord,
};
use sqlx::PgPool;

use crate::DbError;

const RECORD_COLUMNS: &str = "id, timestamp, station_name, station_loc_name, \
     station_loc_lat, station_loc_lon, fuel_type, fuel_quality, fuel_name, fuel_price";

// ---------------------------------------------------------------------------
// Row types
// ---------------------------------------------------------------------------

/// A row from the `fuel_price_records` table.
///
/// Enum columns are read back as text and validated in
/// [`FuelPriceRecordRow::into_stored`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FuelPriceRecordRow {
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    pub station_name: String,
    pub station_loc_name: String,
    pub station_loc_lat: f64,
    pub station_loc_lon: f64,
    pub fuel_type: String,
    /// `NULL` when the quality is unspecified.
    pub fuel_quality: Option<String>,
    pub fuel_name: String,
    pub fuel_price: f64,
}

impl FuelPriceRecordRow {
    /// Converts the raw row into the domain record.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Malformed`] if `fuel_type` or `fuel_quality` hold
    /// values outside the known taxonomy.
    pub fn into_stored(self) -> Result<StoredRecord, DbError> {
        let fuel_type = self
            .fuel_type
            .parse::<FuelType>()
            .map_err(|e| DbError::Malformed(format!("row {}: {e}", self.id)))?;
        let fuel_quality = self
            .fuel_quality
            .as_deref()
            .map(str::parse::<FuelQuality>)
            .transpose()
            .map_err(|e| DbError::Malformed(format!("row {}: {e}", self.id)))?;

        Ok(StoredRecord {
            id: self.id,
            timestamp: self.timestamp,
            station_name: self.station_name,
            location_name: self.station_loc_name,
            lat: self.station_loc_lat,
            lon: self.station_loc_lon,
            fuel_type,
            fuel_quality,
            fuel_name: self.fuel_name,
            price: self.fuel_price,
        })
    }
}

fn quality_column(quality: Option<FuelQuality>) -> Option<&'static str> {
    quality.map(FuelQuality::as_str)
}

// ---------------------------------------------------------------------------
// Read operations
// ---------------------------------------------------------------------------

/// Fetches the record stored under the full identity key.
///
/// `fuel_quality` is compared with `IS NOT DISTINCT FROM` so that an
/// unspecified (`NULL`) quality only matches another `NULL`. Coordinates and
/// the other key columns use exact equality.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Malformed`]
/// if the stored row cannot be decoded.
pub async fn lookup_fuel_price_record(
    pool: &PgPool,
    key: &IdentityKey,
) -> Result<Option<StoredRecord>, DbError> {
    let row = sqlx::query_as::<_, FuelPriceRecordRow>(&format!(
        "SELECT {RECORD_COLUMNS} \
         FROM fuel_price_records \
         WHERE station_name = $1 \
           AND station_loc_lat = $2 \
           AND station_loc_lon = $3 \
           AND fuel_type = $4 \
           AND fuel_quality IS NOT DISTINCT FROM $5"
    ))
    .bind(&key.station_name)
    .bind(key.lat)
    .bind(key.lon)
    .bind(key.fuel_type.as_str())
    .bind(quality_column(key.fuel_quality))
    .fetch_optional(pool)
    .await?;

    row.map(FuelPriceRecordRow::into_stored).transpose()
}

/// Lists stored records, newest write first, optionally for one outlet.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails, or [`DbError::Malformed`]
/// if a stored row cannot be decoded.
pub async fn list_fuel_price_records(
    pool: &PgPool,
    station_name: Option<&str>,
    limit: i64,
) -> Result<Vec<StoredRecord>, DbError> {
    let rows = sqlx::query_as::<_, FuelPriceRecordRow>(&format!(
        "SELECT {RECORD_COLUMNS} \
         FROM fuel_price_records \
         WHERE ($1::TEXT IS NULL OR station_name = $1) \
         ORDER BY timestamp DESC, id DESC \
         LIMIT $2"
    ))
    .bind(station_name)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    rows.into_iter()
        .map(FuelPriceRecordRow::into_stored)
        .collect()
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

/// Inserts a new record; `timestamp` is assigned by the server.
///
/// A clash with the `fuel_price_records_identity` constraint is reported as
/// [`DbError::DuplicateRecord`] so callers can fall back to an update.
///
/// # Errors
///
/// Returns [`DbError::DuplicateRecord`] on a uniqueness violation,
/// [`DbError::Sqlx`] for any other failure.
pub async fn insert_fuel_price_record(
    pool: &PgPool,
    record: &NewFuelPriceRecord,
) -> Result<StoredRecord, DbError> {
    let row = sqlx::query_as::<_, FuelPriceRecordRow>(&format!(
        "INSERT INTO fuel_price_records \
             (station_name, station_loc_name, station_loc_lat, station_loc_lon, \
              fuel_type, fuel_quality, fuel_name, fuel_price) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(&record.key.station_name)
    .bind(&record.fields.location_name)
    .bind(record.key.lat)
    .bind(record.key.lon)
    .bind(record.key.fuel_type.as_str())
    .bind(quality_column(record.key.fuel_quality))
    .bind(&record.fields.fuel_name)
    .bind(record.fields.price)
    .fetch_one(pool)
    .await
    .map_err(map_unique_violation)?;

    row.into_stored()
}

/// Overwrites the mutable fields of the record under `key` and sets
/// `timestamp = NOW()`. Identity columns are never touched.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no record has this key, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn update_fuel_price_record(
    pool: &PgPool,
    key: &IdentityKey,
    fields: &RecordFields,
) -> Result<StoredRecord, DbError> {
    let row = sqlx::query_as::<_, FuelPriceRecordRow>(&format!(
        "UPDATE fuel_price_records \
         SET station_loc_name = $6, \
             fuel_name        = $7, \
             fuel_price       = $8, \
             timestamp        = NOW() \
         WHERE station_name = $1 \
           AND station_loc_lat = $2 \
           AND station_loc_lon = $3 \
           AND fuel_type = $4 \
           AND fuel_quality IS NOT DISTINCT FROM $5 \
         RETURNING {RECORD_COLUMNS}"
    ))
    .bind(&key.station_name)
    .bind(key.lat)
    .bind(key.lon)
    .bind(key.fuel_type.as_str())
    .bind(quality_column(key.fuel_quality))
    .bind(&fields.location_name)
    .bind(&fields.fuel_name)
    .bind(fields.price)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    row.into_stored()
}

fn map_unique_violation(err: sqlx::Error) -> DbError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => DbError::DuplicateRecord,
        _ => DbError::Sqlx(err),
    }
}

// ---------------------------------------------------------------------------
// Store adapter
// ---------------------------------------------------------------------------

/// [`FuelPriceStore`] backed by a Postgres pool.
///
/// Cloning is cheap; every worker can hold its own handle to the same pool.
#[derive(Debug, Clone)]
pub struct PgFuelPriceStore {
    pool: PgPool,
}

impl PgFuelPriceStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::DuplicateRecord => StoreError::UniqueViolation,
            DbError::NotFound => StoreError::NotFound,
            DbError::Malformed(msg) => StoreError::Malformed(msg),
            other => StoreError::Backend(Box::new(other)),
        }
    }
}

impl FuelPriceStore for PgFuelPriceStore {
    async fn lookup_existing(&self, key: &IdentityKey) -> Result<Option<StoredRecord>, StoreError> {
        Ok(lookup_fuel_price_record(&self.pool, key).await?)
    }

    async fn insert_record(&self, record: &NewFuelPriceRecord) -> Result<StoredRecord, StoreError> {
        Ok(insert_fuel_price_record(&self.pool, record).await?)
    }

    async fn update_record(
        &self,
        key: &IdentityKey,
        fields: &RecordFields,
    ) -> Result<StoredRecord, StoreError> {
        Ok(update_fuel_price_record(&self.pool, key, fields).await?)
    }
}
