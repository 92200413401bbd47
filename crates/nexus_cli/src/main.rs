//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open the configured store, run the first-run seed, print collection counts.
//! - Keep output deterministic `key=value` lines for quick local checks.

use nexus_core::{
    core_config, init_logging_from_config, seed_defaults, Collection, RecordStore, SqliteStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("nexus_core ping={}", nexus_core::ping());
    println!("nexus_core version={}", nexus_core::core_version());

    let config = core_config();
    if let Err(err) = init_logging_from_config(config) {
        eprintln!("logging disabled: {err}");
    }

    let store = match SqliteStore::open(&config.db_path) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("store open failed at {}: {err}", config.db_path.display());
            return ExitCode::FAILURE;
        }
    };
    println!("db_path={}", config.db_path.display());
    println!("seed={:?}", seed_defaults(&store));

    for collection in Collection::ALL {
        match store.count(collection) {
            Ok(count) => println!("collection={collection} count={count}"),
            Err(err) => {
                eprintln!("count failed for {collection}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    match store.close() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("store close failed: {err}");
            ExitCode::FAILURE
        }
    }
}
