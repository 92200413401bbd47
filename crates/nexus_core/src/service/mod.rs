//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store calls into use-case level APIs.
//! - Borrow one injected store handle; services never open storage themselves.

pub mod catalog_service;
pub mod license_service;
pub mod seed;
