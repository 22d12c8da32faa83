//! Margin utilization alerts.
//!
//! An edge-triggered detector: it fires once when utilization crosses a
//! threshold on the way up, never while it stays above, and never on the way
//! down. After an alert fires, further alerts are held back for a cooldown
//! window. The first reading only seeds the monitor.
//!
//! All state sits in [`AlertMonitor`], owned by the caller; thresholds come in
//! through an explicit [`AlertConfig`]. Delivery (browser notification, email,
//! log line) is the caller's job.

use crate::config::ConfigError;
use crate::types::{Quote, Timestamp};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// User-tunable alert settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    pub enabled: bool,
    /// Utilization % that raises a warning.
    pub warning_threshold: Decimal,
    /// Utilization % that raises a critical alert.
    pub critical_threshold: Decimal,
    /// Minimum gap between two fired alerts.
    pub cooldown_ms: i64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            warning_threshold: dec!(75),
            critical_threshold: dec!(90),
            cooldown_ms: 60_000,
        }
    }
}

impl AlertConfig {
    pub const MIN_WARNING_THRESHOLD: Decimal = dec!(50);
    pub const MAX_WARNING_THRESHOLD: Decimal = dec!(95);

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_warning_threshold(mut self, threshold: Decimal) -> Self {
        self.warning_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.warning_threshold < Self::MIN_WARNING_THRESHOLD
            || self.warning_threshold > Self::MAX_WARNING_THRESHOLD
        {
            return Err(ConfigError::InvalidAlert {
                reason: format!(
                    "warning threshold {} outside {}-{}",
                    self.warning_threshold,
                    Self::MIN_WARNING_THRESHOLD,
                    Self::MAX_WARNING_THRESHOLD
                ),
            });
        }
        if self.critical_threshold <= self.warning_threshold || self.critical_threshold > dec!(100) {
            return Err(ConfigError::InvalidAlert {
                reason: format!(
                    "critical threshold {} must be above warning {} and at most 100",
                    self.critical_threshold, self.warning_threshold
                ),
            });
        }
        if self.cooldown_ms < 0 {
            return Err(ConfigError::InvalidAlert {
                reason: "cooldown must not be negative".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarginAlert {
    pub severity: AlertSeverity,
    pub utilization: Decimal,
    pub available_margin: Quote,
    pub fired_at: Timestamp,
    pub title: String,
    pub message: String,
}

impl MarginAlert {
    fn new(severity: AlertSeverity, utilization: Decimal, available_margin: Quote, fired_at: Timestamp) -> Self {
        let util = format!("{:.1}", utilization.round_dp(1));
        let avail = format!("{:.2}", available_margin.value().round_dp(2));
        let (title, message) = match severity {
            AlertSeverity::Critical => (
                "CRITICAL: Margin Alert".to_string(),
                format!("Margin utilization at {util}%! Available: ${avail}. Risk of liquidation."),
            ),
            AlertSeverity::Warning => (
                "Warning: High Margin Utilization".to_string(),
                format!("Margin utilization reached {util}%. Available: ${avail}"),
            ),
        };
        Self {
            severity,
            utilization,
            available_margin,
            fired_at,
            title,
            message,
        }
    }

    // critical alerts should stay on screen until acknowledged
    pub fn requires_interaction(&self) -> bool {
        self.severity == AlertSeverity::Critical
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertMonitor {
    config: AlertConfig,
    last_utilization: Option<Decimal>,
    last_fired_at: Option<Timestamp>,
}

impl AlertMonitor {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            last_utilization: None,
            last_fired_at: None,
        }
    }

    pub fn config(&self) -> &AlertConfig {
        &self.config
    }

    /// Swap thresholds without losing crossing history.
    pub fn set_config(&mut self, config: AlertConfig) {
        self.config = config;
    }

    pub fn last_utilization(&self) -> Option<Decimal> {
        self.last_utilization
    }

    pub fn last_fired_at(&self) -> Option<Timestamp> {
        self.last_fired_at
    }

    /// Feed the next utilization reading. Returns an alert when one fires.
    ///
    /// The reading is always remembered, even when the alert is disabled or
    /// in cooldown, so a crossing swallowed by the cooldown does not fire late.
    pub fn observe(&mut self, utilization: Decimal, available_margin: Quote, now: Timestamp) -> Option<MarginAlert> {
        let previous = self.last_utilization.replace(utilization)?;

        if !self.config.enabled {
            return None;
        }

        // both crossed in one step: the critical one wins
        let severity = if crossed_upward(previous, utilization, self.config.critical_threshold) {
            AlertSeverity::Critical
        } else if crossed_upward(previous, utilization, self.config.warning_threshold) {
            AlertSeverity::Warning
        } else {
            return None;
        };

        if self.in_cooldown(now) {
            debug!(?severity, %utilization, "margin alert suppressed by cooldown");
            return None;
        }

        self.last_fired_at = Some(now);
        info!(?severity, %utilization, available = %available_margin, "margin alert fired");
        Some(MarginAlert::new(severity, utilization, available_margin, now))
    }

    fn in_cooldown(&self, now: Timestamp) -> bool {
        match self.last_fired_at {
            Some(last) => now.millis_since(&last) < self.config.cooldown_ms,
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.last_utilization = None;
        self.last_fired_at = None;
    }
}

fn crossed_upward(previous: Decimal, current: Decimal, threshold: Decimal) -> bool {
    previous < threshold && current >= threshold
}
