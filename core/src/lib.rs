//! Collector dues dashboard core.
//!
//! Turns a collector's member and payment-request records into the summary
//! statistics a collector views, and caches them per selected collector.
//!
//! ```no_run
//! use dues_core::{
//!     clock::SystemClock, config::DuesConfig, coordinator::SnapshotCoordinator,
//!     store::DuesStore,
//! };
//!
//! let config = DuesConfig::default();
//! let store = DuesStore::open("dues.db").unwrap();
//! store.migrate().unwrap();
//!
//! let mut coordinator = SnapshotCoordinator::new(config.policy);
//! let state = coordinator.load(Some("North"), &store, &SystemClock);
//! println!("{}", state.label());
//! ```

pub mod aggregation;
pub mod clock;
pub mod command;
pub mod config;
pub mod coordinator;
pub mod demo;
pub mod error;
pub mod event;
pub mod fetcher;
pub mod member;
pub mod rng;
pub mod snapshot;
pub mod store;
pub mod summary;
pub mod types;

pub use aggregation::compute_snapshot;
pub use coordinator::{SnapshotCoordinator, SnapshotState};
pub use error::{DuesError, DuesResult, FetchError, InputShapeError};
pub use snapshot::StatisticsSnapshot;
