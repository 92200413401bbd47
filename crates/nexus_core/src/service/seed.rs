//! First-run seed for the software catalog.
//!
//! # Invariants
//! - Seeding only writes when the software collection is empty.
//! - Seeding never returns an error; failures are logged and reported as
//!   `SeedOutcome::Failed`.
//! - The emptiness check and the inserts are separate statements, so a
//!   concurrent writer can slip in between them.

use crate::model::software::Software;
use crate::repo::store::{RecordStore, StorageResult};
use log::{error, info};

/// Result of one seed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The collection was empty and this many records were inserted.
    Seeded(usize),
    /// The collection already held this many records; nothing written.
    AlreadyPopulated(usize),
    /// The check or an insert failed; see logs.
    Failed,
}

/// Default catalog written on first run.
pub fn default_software() -> Vec<Software> {
    vec![
        Software {
            id: "1".to_string(),
            name: "Apex Predator Toolkit".to_string(),
            description: "Professional precision tools for elite competitive gaming. Optimized for modern CPUs.".to_string(),
            download_url: "#".to_string(),
            thumbnail: "https://images.unsplash.com/photo-1542751371-adc38448a05e?auto=format&fit=crop&q=80&w=800".to_string(),
            is_licensed: true,
            expiry_days: 30,
            max_downloads: 5,
            is_visible: true,
        },
        Software {
            id: "2".to_string(),
            name: "Cyber Frame Gen 4".to_string(),
            description: "AI-driven frame generation and latency reduction for ultra-smooth visuals.".to_string(),
            download_url: "#".to_string(),
            thumbnail: "https://images.unsplash.com/photo-1550745165-9bc0b252726f?auto=format&fit=crop&q=80&w=800".to_string(),
            is_licensed: false,
            expiry_days: 0,
            max_downloads: 0,
            is_visible: true,
        },
    ]
}

/// Seeds the default catalog when the software collection is empty.
///
/// Best-effort: errors are logged and never propagated, so startup can
/// continue on a store that refused the write.
pub fn seed_defaults<S: RecordStore>(store: &S) -> SeedOutcome {
    match try_seed(store) {
        Ok(outcome) => {
            info!("event=seed module=service status=ok outcome={outcome:?}");
            outcome
        }
        Err(err) => {
            error!("event=seed module=service status=error error={err}");
            SeedOutcome::Failed
        }
    }
}

fn try_seed<S: RecordStore>(store: &S) -> StorageResult<SeedOutcome> {
    let existing = store.get_all::<Software>()?;
    if !existing.is_empty() {
        return Ok(SeedOutcome::AlreadyPopulated(existing.len()));
    }

    let defaults = default_software();
    for software in &defaults {
        store.put(software)?;
    }
    Ok(SeedOutcome::Seeded(defaults.len()))
}
