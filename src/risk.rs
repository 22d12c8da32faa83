//! Risk classification from margin utilization.
//!
//! Tiers are fixed: High at 80% and above, Medium from 60%, Low below that.
//! Each tier includes its lower bound. User-tunable alert thresholds live in
//! [`crate::alerts`], not here.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const HIGH_RISK_UTILIZATION: Decimal = dec!(80);
pub const MEDIUM_RISK_UTILIZATION: Decimal = dec!(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn from_utilization(utilization_percent: Decimal) -> Self {
        if utilization_percent >= HIGH_RISK_UTILIZATION {
            RiskLevel::High
        } else if utilization_percent >= MEDIUM_RISK_UTILIZATION {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }

    pub fn severity(&self) -> u8 {
        match self {
            RiskLevel::Low => 1,
            RiskLevel::Medium => 2,
            RiskLevel::High => 3,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Healthy margin",
            RiskLevel::Medium => "Warning - Monitor positions",
            RiskLevel::High => "Critical - Close to liquidation",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "Low"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::High => write!(f, "High"),
        }
    }
}

/// Level plus the numbers a dashboard shows next to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub severity: u8,
    pub message: String,
}

pub fn assess_risk(utilization_percent: Decimal) -> RiskAssessment {
    let level = RiskLevel::from_utilization(utilization_percent);
    RiskAssessment {
        level,
        severity: level.severity(),
        message: level.message().to_string(),
    }
}
