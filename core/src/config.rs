use crate::types::Amount;
use serde::{Deserialize, Serialize};

/// Yearly due charged to a completed member with no amount of their own.
pub const DEFAULT_YEARLY_AMOUNT: Amount = 40.0;

/// Per-member amount used for the organization-wide expected yearly total.
pub const EXPECTED_YEARLY_AMOUNT: Amount = 40.0;

/// Width of the "recent" window for payments and new members.
pub const RECENT_WINDOW_DAYS: i64 = 30;

/// Upper bound accepted for `recent_window_days` (a hundred years).
pub const MAX_RECENT_WINDOW_DAYS: i64 = 36_500;

/// The policy constants the aggregation engine folds with.
///
/// Collected totals honour per-member overrides of `default_yearly_amount`;
/// the expected total always uses `expected_yearly_amount`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregationPolicy {
    pub default_yearly_amount:  Amount,
    pub expected_yearly_amount: Amount,
    pub recent_window_days:     i64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            default_yearly_amount:  DEFAULT_YEARLY_AMOUNT,
            expected_yearly_amount: EXPECTED_YEARLY_AMOUNT,
            recent_window_days:     RECENT_WINDOW_DAYS,
        }
    }
}

/// Shape of the generated demo dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoDataConfig {
    pub collectors: Vec<String>,
    pub members_per_collector: usize,
    /// Probability that a member has completed the yearly payment.
    pub yearly_completion_rate: f64,
    /// Probability that a member has completed the emergency collection.
    pub emergency_completion_rate: f64,
    /// Pending payment requests generated per collector.
    pub pending_requests_per_collector: usize,
}

impl Default for DemoDataConfig {
    fn default() -> Self {
        Self {
            collectors: vec!["North".into(), "South".into(), "East".into()],
            members_per_collector: 25,
            yearly_completion_rate: 0.6,
            emergency_completion_rate: 0.3,
            pending_requests_per_collector: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuesConfig {
    pub policy: AggregationPolicy,
    pub demo:   DemoDataConfig,
}

impl DuesConfig {
    /// Load from `<data_dir>/dues_config.json`.
    /// Fields missing from the file keep their defaults.
    /// In tests, use DuesConfig::default_test().
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/dues_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DuesConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Like `load`, but a missing file means defaults.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/dues_config.json");
        if std::path::Path::new(&path).exists() {
            Self::load(data_dir)
        } else {
            log::debug!("No config at {path}; using defaults");
            Ok(Self::default())
        }
    }

    fn validate(&self) -> anyhow::Result<()> {
        let p = &self.policy;
        if !(0..=MAX_RECENT_WINDOW_DAYS).contains(&p.recent_window_days) {
            anyhow::bail!(
                "policy.recent_window_days must be within [0, {MAX_RECENT_WINDOW_DAYS}], got {}",
                p.recent_window_days
            );
        }
        if !p.default_yearly_amount.is_finite() || p.default_yearly_amount < 0.0 {
            anyhow::bail!("policy.default_yearly_amount must be a non-negative amount");
        }
        if !p.expected_yearly_amount.is_finite() || p.expected_yearly_amount < 0.0 {
            anyhow::bail!("policy.expected_yearly_amount must be a non-negative amount");
        }
        for (name, rate) in [
            ("yearly_completion_rate", self.demo.yearly_completion_rate),
            ("emergency_completion_rate", self.demo.emergency_completion_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                anyhow::bail!("demo.{name} must be within [0, 1], got {rate}");
            }
        }
        Ok(())
    }

    /// Small, fixed config for unit and integration tests.
    pub fn default_test() -> Self {
        Self {
            policy: AggregationPolicy::default(),
            demo: DemoDataConfig {
                collectors: vec!["Alpha".into(), "Beta".into()],
                members_per_collector: 10,
                yearly_completion_rate: 0.5,
                emergency_completion_rate: 0.25,
                pending_requests_per_collector: 3,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = std::fs::File::create(dir.path().join("dues_config.json")).unwrap();
        writeln!(file, r#"{{ "policy": {{ "default_yearly_amount": 55.0 }} }}"#).unwrap();

        let config = DuesConfig::load(dir.path().to_str().unwrap()).unwrap();
        assert_eq!(config.policy.default_yearly_amount, 55.0);
        assert_eq!(config.policy.expected_yearly_amount, EXPECTED_YEARLY_AMOUNT);
        assert_eq!(config.policy.recent_window_days, RECENT_WINDOW_DAYS);
        assert_eq!(config.demo, DemoDataConfig::default());
    }

    #[test]
    fn missing_file_is_an_error_for_load_but_not_for_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        assert!(DuesConfig::load(data_dir).is_err());
        assert_eq!(DuesConfig::load_or_default(data_dir).unwrap(), DuesConfig::default());
    }

    #[test]
    fn negative_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("dues_config.json"),
            r#"{ "policy": { "recent_window_days": -1 } }"#,
        )
        .unwrap();
        assert!(DuesConfig::load(dir.path().to_str().unwrap()).is_err());
    }

    #[test]
    fn oversized_window_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().to_str().unwrap();
        let path = dir.path().join("dues_config.json");

        std::fs::write(&path, r#"{ "policy": { "recent_window_days": 100000000 } }"#).unwrap();
        let err = DuesConfig::load(data_dir).unwrap_err();
        assert!(err.to_string().contains("recent_window_days"), "got {err}");

        std::fs::write(&path, r#"{ "policy": { "recent_window_days": 36500 } }"#).unwrap();
        assert_eq!(
            DuesConfig::load(data_dir).unwrap().policy.recent_window_days,
            MAX_RECENT_WINDOW_DAYS
        );
    }
}
