//! Reconciliation settings

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Environment variable overriding the match tolerance
pub const MATCH_TOLERANCE_ENV: &str = "BILLING_MATCH_TOLERANCE";

/// Settings applied when reconciling vendor bills against company bills
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationConfig {
    /// A vendor bill matches when |vendor - company total| is strictly below this
    pub match_tolerance: BigDecimal,
}

impl Default for ReconciliationConfig {
    fn default() -> Self {
        Self {
            // one cent
            match_tolerance: BigDecimal::new(1.into(), 2),
        }
    }
}

impl ReconciliationConfig {
    pub fn new(match_tolerance: BigDecimal) -> Self {
        Self { match_tolerance }
    }

    /// Load settings from the environment, falling back to defaults
    pub fn from_env() -> Self {
        match std::env::var(MATCH_TOLERANCE_ENV) {
            Ok(raw) => Self::from_tolerance_str(&raw),
            Err(_) => Self::default(),
        }
    }

    fn from_tolerance_str(raw: &str) -> Self {
        match BigDecimal::from_str(raw.trim()) {
            Ok(tolerance) if tolerance >= BigDecimal::from(0) => Self::new(tolerance),
            _ => {
                tracing::warn!(
                    "Ignoring {}={:?}, expected a non-negative decimal",
                    MATCH_TOLERANCE_ENV,
                    raw
                );
                Self::default()
            }
        }
    }
}
