//! Shared primitive types used across the dashboard.

use chrono::{DateTime, Utc};

/// A collector's display name. Collectors are selected and filtered by name.
pub type CollectorName = String;

/// A monetary amount in the organization's currency units.
pub type Amount = f64;

/// Every date in the dashboard is an instant in UTC.
pub type Timestamp = DateTime<Utc>;
