//! Catalog use-case service for software and video entries.
//!
//! # Responsibility
//! - Admin CRUD for software and videos.
//! - Storefront listing filtered by the visibility toggle.
//!
//! # Invariants
//! - Writes validate the record before it reaches the store.
//! - Deleting software does not touch licenses that reference it.

use crate::model::software::{Software, MAX_EXPIRY_DAYS};
use crate::model::video::Video;
use crate::model::Collection;
use crate::repo::store::{RecordStore, StorageError};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CatalogResult<T> = Result<T, CatalogError>;

#[derive(Debug)]
pub enum CatalogError {
    /// Record failed a write-side rule.
    Validation(String),
    /// Target record does not exist.
    NotFound { collection: Collection, key: String },
    Storage(StorageError),
}

impl Display for CatalogError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(message) => write!(f, "invalid catalog entry: {message}"),
            Self::NotFound { collection, key } => write!(f, "{collection} not found: {key}"),
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Validation(_) | Self::NotFound { .. } => None,
        }
    }
}

impl From<StorageError> for CatalogError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

/// Use-case service over the software and videos collections.
pub struct CatalogService<'s, S: RecordStore> {
    store: &'s S,
}

impl<'s, S: RecordStore> CatalogService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Validates and upserts a software entry.
    pub fn save_software(&self, software: &Software) -> CatalogResult<()> {
        validate_software(software)?;
        self.store.put(software)?;
        info!(
            "event=software_save module=service status=ok id={} licensed={} visible={}",
            software.id, software.is_licensed, software.is_visible
        );
        Ok(())
    }

    pub fn get_software(&self, id: &str) -> CatalogResult<Option<Software>> {
        Ok(self.store.get_by_key::<Software>(id)?)
    }

    /// Admin view: every entry, hidden ones included.
    pub fn list_software(&self) -> CatalogResult<Vec<Software>> {
        Ok(self.store.get_all::<Software>()?)
    }

    /// Storefront view: visible entries only.
    pub fn list_visible_software(&self) -> CatalogResult<Vec<Software>> {
        let mut software = self.store.get_all::<Software>()?;
        software.retain(|entry| entry.is_visible);
        Ok(software)
    }

    /// Flips the storefront toggle of an existing entry.
    pub fn set_software_visibility(&self, id: &str, visible: bool) -> CatalogResult<Software> {
        let mut software =
            self.store
                .get_by_key::<Software>(id)?
                .ok_or_else(|| CatalogError::NotFound {
                    collection: Collection::Software,
                    key: id.to_string(),
                })?;
        software.is_visible = visible;
        self.store.put(&software)?;
        Ok(software)
    }

    /// Removes a software entry. Missing ids are not an error.
    pub fn delete_software(&self, id: &str) -> CatalogResult<()> {
        self.store.delete(Collection::Software, id)?;
        info!("event=software_delete module=service status=ok id={id}");
        Ok(())
    }

    pub fn save_video(&self, video: &Video) -> CatalogResult<()> {
        for (field, value) in [
            ("id", &video.id),
            ("title", &video.title),
            ("url", &video.url),
        ] {
            if value.trim().is_empty() {
                return Err(CatalogError::Validation(format!(
                    "video {field} must not be empty"
                )));
            }
        }
        self.store.put(video)?;
        Ok(())
    }

    pub fn get_video(&self, id: &str) -> CatalogResult<Option<Video>> {
        Ok(self.store.get_by_key::<Video>(id)?)
    }

    pub fn list_videos(&self) -> CatalogResult<Vec<Video>> {
        Ok(self.store.get_all::<Video>()?)
    }

    pub fn delete_video(&self, id: &str) -> CatalogResult<()> {
        self.store.delete(Collection::Videos, id)?;
        Ok(())
    }
}

fn validate_software(software: &Software) -> CatalogResult<()> {
    if software.id.trim().is_empty() {
        return Err(CatalogError::Validation(
            "software id must not be empty".to_string(),
        ));
    }
    if software.name.trim().is_empty() {
        return Err(CatalogError::Validation(format!(
            "software `{}` needs a name",
            software.id
        )));
    }
    if software.expiry_days > MAX_EXPIRY_DAYS {
        return Err(CatalogError::Validation(format!(
            "software `{}` expiry_days {} exceeds {MAX_EXPIRY_DAYS}",
            software.id, software.expiry_days
        )));
    }
    if software.is_licensed {
        if software.expiry_days == 0 || software.max_downloads == 0 {
            return Err(CatalogError::Validation(format!(
                "licensed software `{}` needs expiry_days > 0 and max_downloads > 0",
                software.id
            )));
        }
    } else if software.expiry_days != 0 {
        return Err(CatalogError::Validation(format!(
            "unlicensed software `{}` must have expiry_days = 0",
            software.id
        )));
    }
    Ok(())
}
