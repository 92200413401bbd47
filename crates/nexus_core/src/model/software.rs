//! Software catalog record.

use super::{Collection, Record};
use serde::{Deserialize, Serialize};

/// Upper bound on `expiry_days`; keeps issued expiry dates four-digit years.
pub const MAX_EXPIRY_DAYS: u32 = 36_500;

/// Downloadable product listed in the storefront.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Software {
    pub id: String,
    pub name: String,
    pub description: String,
    pub download_url: String,
    pub thumbnail: String,
    /// Whether a license key is required to download.
    pub is_licensed: bool,
    /// License validity window in days. 0 when unlicensed.
    pub expiry_days: u32,
    /// Download cap copied onto each issued license.
    pub max_downloads: u32,
    /// Storefront display toggle.
    pub is_visible: bool,
}

impl Software {
    /// Creates a visible, unlicensed entry with empty display fields.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            download_url: String::new(),
            thumbnail: String::new(),
            is_licensed: false,
            expiry_days: 0,
            max_downloads: 0,
            is_visible: true,
        }
    }

    /// Turns this entry into licensed software with the given window and cap.
    pub fn licensed(mut self, expiry_days: u32, max_downloads: u32) -> Self {
        self.is_licensed = true;
        self.expiry_days = expiry_days;
        self.max_downloads = max_downloads;
        self
    }
}

impl Record for Software {
    const COLLECTION: Collection = Collection::Software;

    fn key(&self) -> &str {
        &self.id
    }
}
