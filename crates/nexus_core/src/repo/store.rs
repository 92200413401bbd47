//! Collection store contracts and SQLite implementation.
//!
//! Records are kept as JSON documents next to their key column, one table per
//! collection. Reads reject rows that fail to decode or whose embedded key
//! disagrees with the key column instead of masking them.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::{Collection, Record, UnknownCollection};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type StorageResult<T> = Result<T, StorageError>;

/// Error raised by record store operations.
#[derive(Debug)]
pub enum StorageError {
    /// Engine failure on open, read, write or delete.
    Db(DbError),
    /// Collection name does not match any known collection.
    UnknownCollection(String),
    /// A persisted row could not be turned back into its record.
    InvalidData(String),
    /// A record could not be encoded for storage.
    Serialization(serde_json::Error),
    /// Connection schema version is not the one this build writes.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Collection table is missing from an otherwise versioned database.
    MissingRequiredTable(&'static str),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UnknownCollection(name) => write!(f, "unknown collection `{name}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted record: {message}"),
            Self::Serialization(err) => write!(f, "record serialization failed: {err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "record store requires schema version {expected_version}, found {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "record store requires table `{table}`")
            }
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialization(err) => Some(err),
            Self::UnknownCollection(_)
            | Self::InvalidData(_)
            | Self::UninitializedConnection { .. }
            | Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for StorageError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<UnknownCollection> for StorageError {
    fn from(value: UnknownCollection) -> Self {
        Self::UnknownCollection(value.0)
    }
}

/// Collection-scoped record storage.
///
/// Typed calls take their collection from the record type, so a `Software`
/// can never land in `licenses`.
pub trait RecordStore {
    /// Returns every record of `T`'s collection, ordered by key.
    fn get_all<T: Record>(&self) -> StorageResult<Vec<T>>;
    /// Point lookup; `Ok(None)` when the key is absent.
    fn get_by_key<T: Record>(&self, key: &str) -> StorageResult<Option<T>>;
    /// Inserts or overwrites the record under its key.
    fn put<T: Record>(&self, item: &T) -> StorageResult<()>;
    /// Removes `key` from `collection`. Absent keys are not an error.
    fn delete(&self, collection: Collection, key: &str) -> StorageResult<()>;
    /// Number of records in `collection`.
    fn count(&self, collection: Collection) -> StorageResult<u64>;
}

/// SQLite-backed record store owning its connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (creating if needed) the store file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StorageResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` when a collection table is absent.
    pub fn try_new(conn: Connection) -> StorageResult<Self> {
        ensure_store_ready(&conn)?;
        Ok(Self { conn })
    }

    /// Underlying connection, for diagnostics and tests.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the store, surfacing any error from the final flush.
    pub fn close(self) -> StorageResult<()> {
        self.conn.close().map_err(|(_, err)| {
            warn!("event=store_close module=repo status=error error={err}");
            StorageError::from(err)
        })?;
        info!("event=store_close module=repo status=ok");
        Ok(())
    }

    /// Returns raw documents of a collection addressed by name.
    ///
    /// Used by callers that only know the collection at runtime.
    pub fn get_all_documents(&self, collection_name: &str) -> StorageResult<Vec<serde_json::Value>> {
        let collection: Collection = collection_name.parse()?;
        self.load_rows(collection)?
            .into_iter()
            .map(|(key, body)| decode_body(collection, &key, &body))
            .collect()
    }

    fn load_rows(&self, collection: Collection) -> StorageResult<Vec<(String, String)>> {
        let key_field = collection.key_field();
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {key_field}, body FROM {collection} ORDER BY {key_field} ASC;"
        ))?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<(String, String)>>>()?;
        Ok(rows)
    }
}

impl RecordStore for SqliteStore {
    fn get_all<T: Record>(&self) -> StorageResult<Vec<T>> {
        let collection = T::COLLECTION;
        let records = self
            .load_rows(collection)?
            .into_iter()
            .map(|(key, body)| decode_record::<T>(&key, &body))
            .collect::<StorageResult<Vec<T>>>()?;
        debug!(
            "event=store_get_all module=repo collection={collection} count={}",
            records.len()
        );
        Ok(records)
    }

    fn get_by_key<T: Record>(&self, key: &str) -> StorageResult<Option<T>> {
        let collection = T::COLLECTION;
        let key_field = collection.key_field();
        let body: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT body FROM {collection} WHERE {key_field} = ?1;"),
                [key],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|body| decode_record::<T>(key, &body)).transpose()
    }

    fn put<T: Record>(&self, item: &T) -> StorageResult<()> {
        let collection = T::COLLECTION;
        let key_field = collection.key_field();
        let body = serde_json::to_string(item).map_err(StorageError::Serialization)?;
        self.conn.execute(
            &format!(
                "INSERT INTO {collection} ({key_field}, body) VALUES (?1, ?2)
                 ON CONFLICT({key_field}) DO UPDATE SET body = excluded.body;"
            ),
            params![item.key(), body],
        )?;
        debug!(
            "event=store_put module=repo collection={collection} key={}",
            item.key()
        );
        Ok(())
    }

    fn delete(&self, collection: Collection, key: &str) -> StorageResult<()> {
        let key_field = collection.key_field();
        let removed = self.conn.execute(
            &format!("DELETE FROM {collection} WHERE {key_field} = ?1;"),
            [key],
        )?;
        debug!("event=store_delete module=repo collection={collection} key={key} removed={removed}");
        Ok(())
    }

    fn count(&self, collection: Collection) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {collection};"), [], |row| {
                    row.get(0)
                })?;
        u64::try_from(count)
            .map_err(|_| StorageError::InvalidData(format!("negative row count in {collection}")))
    }
}

fn decode_record<T: Record>(key: &str, body: &str) -> StorageResult<T> {
    let collection = T::COLLECTION;
    let record: T = serde_json::from_str(body).map_err(|err| {
        StorageError::InvalidData(format!(
            "cannot decode {collection}.{} `{key}`: {err}",
            collection.key_field()
        ))
    })?;
    if record.key() != key {
        return Err(StorageError::InvalidData(format!(
            "{collection} row `{key}` embeds mismatched key `{}`",
            record.key()
        )));
    }
    Ok(record)
}

fn decode_body(collection: Collection, key: &str, body: &str) -> StorageResult<serde_json::Value> {
    serde_json::from_str(body).map_err(|err| {
        StorageError::InvalidData(format!(
            "cannot decode {collection}.{} `{key}`: {err}",
            collection.key_field()
        ))
    })
}

fn ensure_store_ready(conn: &Connection) -> StorageResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(StorageError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for collection in Collection::ALL {
        if !table_exists(conn, collection.name())? {
            return Err(StorageError::MissingRequiredTable(collection.name()));
        }
    }
    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> StorageResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}
