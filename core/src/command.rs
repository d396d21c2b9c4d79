use serde::{Deserialize, Serialize};
use crate::types::CollectorName;

/// Commands the presentation layer sends to the dashboard.
/// Variants are added, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardCommand {
    /// Change the active collector. `null` clears the selection.
    Select {
        #[serde(default)]
        collector: Option<CollectorName>,
    },
    /// Invalidate the cached snapshot and re-fetch.
    Refresh,
    GetState,
    Quit,
}
