//! # Petclinic
//!
//! A clinic backend for owners, pets and appointments, usable both as a
//! standalone binary and as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! petclinic = { version = "0.0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use chrono::Duration;
//! use petclinic::auth::CredentialVerifier;
//! use petclinic::server::{AppState, create_router};
//! use petclinic::service::BusinessHours;
//! use petclinic::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/petclinic.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(
//!     Arc::new(store),
//!     CredentialVerifier::new(&secret, Duration::hours(24)),
//!     BusinessHours::default(),
//! ));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `petclinic` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod service;
pub mod store;
pub mod types;
