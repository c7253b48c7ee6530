//! Patta Storage Layer
//!
//! Implements the `ClaimStore` trait on top of SQLite.
//!
//! # Architecture
//!
//! - One row per claim record, canonical fields as typed columns
//! - Metadata bag and anomaly detail kept as JSON text so they round-trip verbatim
//! - Identities are UUIDv7 strings assigned here, at insert time
//!
//! # Examples
//!
//! ```no_run
//! use patta_store::SqliteStore;
//!
//! let store = SqliteStore::new(":memory:").unwrap();
//! // Store is now ready for claim operations
//! ```

#![warn(missing_docs)]

use patta_domain::traits::{ClaimFilter, ClaimStore};
use patta_domain::{
    AnomalyFinding, ClaimCategory, ClaimId, ClaimPatch, ClaimRecord, FieldMap, NewClaim,
    ProcessingMethod, ReviewStatus,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON column could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Invalid data format
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

const SELECT_COLUMNS: &str = "SELECT id, claimant_name, state, district, village, claim_type, area,
        is_anomaly, anomaly_details, submitted_at, extracted_metadata, processing_method, status
     FROM claims";

/// SQLite-based implementation of ClaimStore
///
/// # Thread Safety
///
/// SQLite connections are not `Sync`. Share a store between tasks by wrapping
/// it in a `Mutex`.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given path
    ///
    /// Use `:memory:` for an in-memory database (useful for testing).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use patta_store::SqliteStore;
    ///
    /// let store = SqliteStore::new("patta.db").unwrap();
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        let mut store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&mut self) -> Result<(), StoreError> {
        let schema = include_str!("schema.sql");
        self.conn.execute_batch(schema)?;
        Ok(())
    }

    /// Number of stored records
    pub fn count(&self) -> Result<usize, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM claims", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Map a row onto a ClaimRecord
    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<ClaimRecord> {
        let id_str: String = row.get(0)?;
        let id = ClaimId::from_string(&id_str).map_err(|e| conversion_failure(0, e))?;

        let category_str: String = row.get(5)?;
        let claim_type = ClaimCategory::parse(&category_str)
            .ok_or_else(|| conversion_failure(5, format!("Unknown claim type: {}", category_str)))?;

        let details_json: Option<String> = row.get(8)?;
        let anomaly_details = details_json
            .map(|json| serde_json::from_str::<AnomalyFinding>(&json))
            .transpose()
            .map_err(|e| conversion_failure(8, e.to_string()))?;

        let metadata_json: String = row.get(10)?;
        let extracted_metadata = serde_json::from_str::<FieldMap>(&metadata_json)
            .map_err(|e| conversion_failure(10, e.to_string()))?;

        let method_str: String = row.get(11)?;
        let processing_method = ProcessingMethod::parse(&method_str).ok_or_else(|| {
            conversion_failure(11, format!("Unknown processing method: {}", method_str))
        })?;

        let status_str: String = row.get(12)?;
        let status = ReviewStatus::parse(&status_str)
            .ok_or_else(|| conversion_failure(12, format!("Unknown review status: {}", status_str)))?;

        Ok(ClaimRecord {
            id,
            claimant_name: row.get(1)?,
            state: row.get(2)?,
            district: row.get(3)?,
            village: row.get(4)?,
            claim_type,
            area: row.get(6)?,
            is_anomaly: row.get::<_, i64>(7)? != 0,
            anomaly_details,
            submitted_at: row.get::<_, i64>(9)? as u64,
            extracted_metadata,
            processing_method,
            status,
        })
    }
}

fn conversion_failure(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        Box::new(StoreError::InvalidData(message)),
    )
}

impl ClaimStore for SqliteStore {
    type Error = StoreError;

    fn insert(&mut self, claim: NewClaim) -> Result<ClaimId, Self::Error> {
        if !claim.area.is_finite() || claim.area < 0.0 {
            return Err(StoreError::InvalidData(format!(
                "area must be finite and non-negative, got {}",
                claim.area
            )));
        }

        let id = ClaimId::new();
        let metadata_json = serde_json::to_string(&claim.extracted_metadata)?;
        let details_json = claim
            .anomaly_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn.execute(
            "INSERT INTO claims (id, claimant_name, state, district, village, claim_type, area,
                                 is_anomaly, anomaly_details, submitted_at, extracted_metadata, processing_method, status)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
            params![
                id.to_string(),
                &claim.claimant_name,
                &claim.state,
                &claim.district,
                &claim.village,
                claim.claim_type.as_str(),
                claim.area,
                claim.is_anomaly as i64,
                details_json,
                claim.submitted_at as i64,
                metadata_json,
                claim.processing_method.as_str(),
                claim.status.as_str(),
            ],
        )?;

        debug!(claim_id = %id, method = %claim.processing_method, "Inserted claim");
        Ok(id)
    }

    fn get(&self, id: ClaimId) -> Result<Option<ClaimRecord>, Self::Error> {
        let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
        let record = self
            .conn
            .query_row(&sql, params![id.to_string()], Self::row_to_record)
            .optional()?;
        Ok(record)
    }

    fn scan(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, Self::Error> {
        let mut sql = format!("{} WHERE 1=1", SELECT_COLUMNS);
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(anomalous) = filter.anomalous {
            sql.push_str(" AND is_anomaly = ?");
            params.push(Box::new(anomalous as i64));
        }

        if let Some(village) = &filter.village {
            sql.push_str(" AND village = ?");
            params.push(Box::new(village.clone()));
        }

        if let Some(category) = filter.claim_type {
            sql.push_str(" AND claim_type = ?");
            params.push(Box::new(category.as_str()));
        }

        sql.push_str(" ORDER BY rowid");

        if let Some(limit) = filter.limit {
            sql.push_str(" LIMIT ?");
            params.push(Box::new(limit as i64));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let param_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let records = stmt
            .query_map(&param_refs[..], Self::row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    fn update_one(&mut self, id: ClaimId, patch: &ClaimPatch) -> Result<bool, Self::Error> {
        if patch.is_empty() {
            return Ok(self.get(id)?.is_some());
        }

        let details_json = patch
            .anomaly_details
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        let changed = self.conn.execute(
            "UPDATE claims
             SET is_anomaly = COALESCE(?1, is_anomaly),
                 anomaly_details = COALESCE(?2, anomaly_details)
             WHERE id = ?3",
            params![patch.is_anomaly.map(|f| f as i64), details_json, id.to_string()],
        )?;

        Ok(changed > 0)
    }
}
