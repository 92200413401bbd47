//! License issuance and download authorization.
//!
//! # Responsibility
//! - Issue licenses for licensed software.
//! - Decide whether a download may proceed and record it on the license.
//!
//! # Invariants
//! - A granted licensed download always persists the bumped license before
//!   returning.
//! - `software_id` on a license is checked on use, never enforced on write.
//! - The read-check-write in `authorize_download` is not atomic across handles.

use crate::model::license::{
    expiry_from, generate_license_key, is_valid_license_key, DownloadDenial, License,
};
use crate::model::software::Software;
use crate::model::Collection;
use crate::repo::store::{RecordStore, StorageError};
use chrono::NaiveDate;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type LicenseResult<T> = Result<T, LicenseError>;

#[derive(Debug)]
pub enum LicenseError {
    /// Software is missing, or hidden from the storefront.
    SoftwareNotFound(String),
    /// Licenses can only be issued for software that requires one.
    SoftwareNotLicensed(String),
    /// Licensed software requested without a key.
    LicenseRequired(String),
    InvalidKeyFormat(String),
    LicenseNotFound(String),
    /// Key belongs to a different software entry.
    WrongSoftware { key: String, software_id: String },
    Expired { key: String, expiry_date: NaiveDate },
    BoundToOtherBrowser(String),
    /// Licensed download attempted without a browser id to bind to.
    BrowserIdRequired(String),
    DownloadLimitReached { key: String, max_downloads: u32 },
    /// Persisted expiry date could not be parsed.
    InvalidExpiryDate { key: String, value: String },
    Storage(StorageError),
}

impl Display for LicenseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SoftwareNotFound(id) => write!(f, "software not found: {id}"),
            Self::SoftwareNotLicensed(id) => write!(f, "software `{id}` does not use licenses"),
            Self::LicenseRequired(id) => write!(f, "software `{id}` requires a license key"),
            Self::InvalidKeyFormat(key) => write!(f, "malformed license key `{key}`"),
            Self::LicenseNotFound(key) => write!(f, "license not found: {key}"),
            Self::WrongSoftware { key, software_id } => {
                write!(f, "license `{key}` is not valid for software `{software_id}`")
            }
            Self::Expired { key, expiry_date } => {
                write!(f, "license `{key}` expired on {expiry_date}")
            }
            Self::BoundToOtherBrowser(key) => {
                write!(f, "license `{key}` is bound to another browser")
            }
            Self::BrowserIdRequired(id) => {
                write!(f, "software `{id}` requires a browser id for licensed downloads")
            }
            Self::DownloadLimitReached { key, max_downloads } => write!(
                f,
                "license `{key}` reached its download limit of {max_downloads}"
            ),
            Self::InvalidExpiryDate { key, value } => {
                write!(f, "license `{key}` has invalid expiry date `{value}`")
            }
            Self::Storage(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LicenseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for LicenseError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl LicenseError {
    fn from_denial(software_id: &str, key: &str, denial: DownloadDenial) -> Self {
        let key = key.to_string();
        match denial {
            DownloadDenial::MissingBrowserId => Self::BrowserIdRequired(software_id.to_string()),
            DownloadDenial::Expired { expiry_date } => Self::Expired { key, expiry_date },
            DownloadDenial::BoundToOtherBrowser => Self::BoundToOtherBrowser(key),
            DownloadDenial::LimitReached { max_downloads } => {
                Self::DownloadLimitReached { key, max_downloads }
            }
            DownloadDenial::InvalidExpiryDate(value) => Self::InvalidExpiryDate { key, value },
        }
    }
}

/// Outcome of a successful download authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadGrant {
    pub software_id: String,
    pub download_url: String,
    /// Updated license, `None` for unlicensed software.
    pub license: Option<License>,
}

impl DownloadGrant {
    /// Downloads left on the license after this one; `None` when unlimited.
    pub fn remaining_downloads(&self) -> Option<u32> {
        self.license.as_ref().map(License::remaining_downloads)
    }
}

/// Use-case service over the licenses collection.
pub struct LicenseService<'s, S: RecordStore> {
    store: &'s S,
}

impl<'s, S: RecordStore> LicenseService<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Issues a fresh license for licensed software, valid from `today`.
    ///
    /// Expiry is `today + expiry_days`; the download cap is copied from the
    /// software entry at issue time.
    pub fn issue_license(&self, software_id: &str, today: NaiveDate) -> LicenseResult<License> {
        let software = self
            .store
            .get_by_key::<Software>(software_id)?
            .ok_or_else(|| LicenseError::SoftwareNotFound(software_id.to_string()))?;
        if !software.is_licensed {
            return Err(LicenseError::SoftwareNotLicensed(software_id.to_string()));
        }

        let license = License::issue(
            generate_license_key(),
            software.id.as_str(),
            expiry_from(today, software.expiry_days),
            software.max_downloads,
        );
        self.store.put(&license)?;
        info!(
            "event=license_issue module=service status=ok key={} software_id={} expiry_date={}",
            license.key, license.software_id, license.expiry_date
        );
        Ok(license)
    }

    pub fn get_license(&self, key: &str) -> LicenseResult<Option<License>> {
        Ok(self.store.get_by_key::<License>(key)?)
    }

    pub fn list_licenses(&self) -> LicenseResult<Vec<License>> {
        Ok(self.store.get_all::<License>()?)
    }

    pub fn list_licenses_for_software(&self, software_id: &str) -> LicenseResult<Vec<License>> {
        let mut licenses = self.store.get_all::<License>()?;
        licenses.retain(|license| license.software_id == software_id);
        Ok(licenses)
    }

    /// Deletes a license. Unknown keys are not an error.
    pub fn revoke_license(&self, key: &str) -> LicenseResult<()> {
        self.store.delete(Collection::Licenses, key)?;
        info!("event=license_revoke module=service status=ok key={key}");
        Ok(())
    }

    /// Decides whether `browser_id` may download `software_id` on `today`.
    ///
    /// Unlicensed software is granted without touching any license. For
    /// licensed software the license is bound to `browser_id` on first use,
    /// its count is bumped and it is persisted before the grant is returned.
    pub fn authorize_download(
        &self,
        software_id: &str,
        key: Option<&str>,
        browser_id: &str,
        today: NaiveDate,
    ) -> LicenseResult<DownloadGrant> {
        let result = self.try_authorize(software_id, key, browser_id, today);
        match &result {
            Ok(grant) => info!(
                "event=download_authorize module=service status=ok software_id={} remaining={:?}",
                software_id,
                grant.remaining_downloads()
            ),
            Err(err) => warn!(
                "event=download_authorize module=service status=denied software_id={} error={}",
                software_id, err
            ),
        }
        result
    }

    fn try_authorize(
        &self,
        software_id: &str,
        key: Option<&str>,
        browser_id: &str,
        today: NaiveDate,
    ) -> LicenseResult<DownloadGrant> {
        let software = self
            .store
            .get_by_key::<Software>(software_id)?
            .filter(|software| software.is_visible)
            .ok_or_else(|| LicenseError::SoftwareNotFound(software_id.to_string()))?;

        if !software.is_licensed {
            return Ok(DownloadGrant {
                software_id: software.id,
                download_url: software.download_url,
                license: None,
            });
        }

        let browser_id = browser_id.trim();
        if browser_id.is_empty() {
            return Err(LicenseError::BrowserIdRequired(software_id.to_string()));
        }

        let key = key
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| LicenseError::LicenseRequired(software_id.to_string()))?;
        if !is_valid_license_key(key) {
            return Err(LicenseError::InvalidKeyFormat(key.to_string()));
        }

        let mut license = self
            .store
            .get_by_key::<License>(key)?
            .ok_or_else(|| LicenseError::LicenseNotFound(key.to_string()))?;
        if license.software_id != software.id {
            return Err(LicenseError::WrongSoftware {
                key: key.to_string(),
                software_id: software.id,
            });
        }

        license
            .check_download(browser_id, today)
            .map_err(|denial| LicenseError::from_denial(software_id, key, denial))?;
        license.record_download(browser_id);
        self.store.put(&license)?;

        Ok(DownloadGrant {
            software_id: software.id,
            download_url: software.download_url,
            license: Some(license),
        })
    }
}
