//! License record and its download rules.
//!
//! # Responsibility
//! - Define the persisted license shape.
//! - Provide storage-free checks for expiry, browser binding and download cap.
//!
//! # Invariants
//! - `download_count <= max_downloads` after every recorded download.
//! - An empty `bound_browser_id` means the license is not bound yet.
//! - The expiry day itself is still valid; expiry starts the day after.

use super::{Collection, Record};
use chrono::{DateTime, Days, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Calendar date format used for `expiry_date` on write.
pub const EXPIRY_DATE_FORMAT: &str = "%Y-%m-%d";

const LICENSE_KEY_PREFIX: &str = "NEX";
const LICENSE_KEY_GROUPS: usize = 4;
const LICENSE_KEY_GROUP_LEN: usize = 4;

static LICENSE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^NEX(-[0-9A-F]{4}){4}$").expect("valid license key regex"));

/// Issued access token limiting downloads of one software entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    pub key: String,
    /// Software this license unlocks. Not enforced by storage.
    pub software_id: String,
    /// `YYYY-MM-DD`; RFC 3339 timestamps are accepted on read.
    pub expiry_date: String,
    pub is_used: bool,
    pub bound_browser_id: String,
    pub download_count: u32,
    pub max_downloads: u32,
}

/// Reason a license cannot serve a download right now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadDenial {
    Expired { expiry_date: NaiveDate },
    BoundToOtherBrowser,
    /// Blank browser id; binding to it would leave the license unbound.
    MissingBrowserId,
    LimitReached { max_downloads: u32 },
    InvalidExpiryDate(String),
}

impl Display for DownloadDenial {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expired { expiry_date } => write!(f, "license expired on {expiry_date}"),
            Self::BoundToOtherBrowser => write!(f, "license is bound to another browser"),
            Self::MissingBrowserId => write!(f, "browser id must not be blank"),
            Self::LimitReached { max_downloads } => {
                write!(f, "download limit of {max_downloads} reached")
            }
            Self::InvalidExpiryDate(value) => write!(f, "invalid license expiry date `{value}`"),
        }
    }
}

impl Error for DownloadDenial {}

impl License {
    /// Creates an unused, unbound license expiring on `expiry`.
    pub fn issue(
        key: impl Into<String>,
        software_id: impl Into<String>,
        expiry: NaiveDate,
        max_downloads: u32,
    ) -> Self {
        Self {
            key: key.into(),
            software_id: software_id.into(),
            expiry_date: expiry.format(EXPIRY_DATE_FORMAT).to_string(),
            is_used: false,
            bound_browser_id: String::new(),
            download_count: 0,
            max_downloads,
        }
    }

    /// Parses `expiry_date` into a calendar date.
    pub fn expiry(&self) -> Result<NaiveDate, DownloadDenial> {
        parse_expiry_date(&self.expiry_date)
    }

    pub fn is_expired_on(&self, today: NaiveDate) -> Result<bool, DownloadDenial> {
        Ok(today > self.expiry()?)
    }

    pub fn remaining_downloads(&self) -> u32 {
        self.max_downloads.saturating_sub(self.download_count)
    }

    pub fn is_bound(&self) -> bool {
        !self.bound_browser_id.is_empty()
    }

    /// Checks whether `browser_id` may download with this license on `today`.
    ///
    /// Checks run in order: browser id presence, expiry, browser binding,
    /// download cap.
    pub fn check_download(&self, browser_id: &str, today: NaiveDate) -> Result<(), DownloadDenial> {
        if browser_id.trim().is_empty() {
            return Err(DownloadDenial::MissingBrowserId);
        }
        let expiry_date = self.expiry()?;
        if today > expiry_date {
            return Err(DownloadDenial::Expired { expiry_date });
        }
        if self.is_bound() && self.bound_browser_id != browser_id {
            return Err(DownloadDenial::BoundToOtherBrowser);
        }
        if self.download_count >= self.max_downloads {
            return Err(DownloadDenial::LimitReached {
                max_downloads: self.max_downloads,
            });
        }
        Ok(())
    }

    /// Applies one successful download: binds on first use and bumps the count.
    ///
    /// Callers must run `check_download` first.
    pub fn record_download(&mut self, browser_id: &str) {
        if !self.is_bound() {
            self.bound_browser_id = browser_id.to_string();
        }
        self.download_count = self.download_count.saturating_add(1);
        self.is_used = true;
    }
}

impl Record for License {
    const COLLECTION: Collection = Collection::Licenses;

    fn key(&self) -> &str {
        &self.key
    }
}

/// Returns `today + days`, saturating at the maximum representable date.
pub fn expiry_from(today: NaiveDate, days: u32) -> NaiveDate {
    today
        .checked_add_days(Days::new(u64::from(days)))
        .unwrap_or(NaiveDate::MAX)
}

/// Generates a fresh key in `NEX-XXXX-XXXX-XXXX-XXXX` form.
pub fn generate_license_key() -> String {
    let hex = Uuid::new_v4().simple().to_string().to_ascii_uppercase();
    let mut key = String::from(LICENSE_KEY_PREFIX);
    for group in hex
        .as_bytes()
        .chunks(LICENSE_KEY_GROUP_LEN)
        .take(LICENSE_KEY_GROUPS)
    {
        key.push('-');
        key.push_str(std::str::from_utf8(group).unwrap_or_default());
    }
    key
}

/// Returns whether `key` has the shape produced by [`generate_license_key`].
pub fn is_valid_license_key(key: &str) -> bool {
    LICENSE_KEY_RE.is_match(key)
}

fn parse_expiry_date(value: &str) -> Result<NaiveDate, DownloadDenial> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, EXPIRY_DATE_FORMAT) {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.date_naive())
        .map_err(|_| DownloadDenial::InvalidExpiryDate(value.to_string()))
}
