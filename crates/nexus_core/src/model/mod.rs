//! Record shapes held by the store.
//!
//! # Responsibility
//! - Define the three persisted shapes: software, video, license.
//! - Declare which collection each shape lives in and its key field.
//!
//! # Invariants
//! - Serialized field names are camelCase and stable across versions.
//! - A record's key never changes for its lifetime; a new key is a new record.

pub mod license;
pub mod software;
pub mod video;

use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Named, independently keyed group of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Software,
    Videos,
    Licenses,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Software, Self::Videos, Self::Licenses];

    /// Storage name, also used as the SQLite table name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Software => "software",
            Self::Videos => "videos",
            Self::Licenses => "licenses",
        }
    }

    /// Name of the column holding the record key.
    pub fn key_field(self) -> &'static str {
        match self {
            Self::Software | Self::Videos => "id",
            Self::Licenses => "key",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a collection name does not match any known collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCollection(pub String);

impl Display for UnknownCollection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown collection `{}`", self.0)
    }
}

impl std::error::Error for UnknownCollection {}

impl FromStr for Collection {
    type Err = UnknownCollection;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.name() == value)
            .ok_or_else(|| UnknownCollection(value.to_string()))
    }
}

/// A shape that lives in exactly one collection under a string key.
pub trait Record: serde::Serialize + serde::de::DeserializeOwned {
    const COLLECTION: Collection;

    /// Value of the collection's key field for this record.
    fn key(&self) -> &str;
}
