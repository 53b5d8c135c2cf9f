//! Alert Types
//!
//! Data only; classification lives in `classifier`.

use serde::{Deserialize, Serialize};

/// Discretized severity, ordered NONE < INFO < WARNING < CRITICAL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertTier {
    /// Below the lowest threshold, never notified
    None,
    Info,
    Warning,
    Critical,
}

impl AlertTier {
    pub const ALL: [AlertTier; 4] = [
        AlertTier::None,
        AlertTier::Info,
        AlertTier::Warning,
        AlertTier::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AlertTier::None => "NONE",
            AlertTier::Info => "INFO",
            AlertTier::Warning => "WARNING",
            AlertTier::Critical => "CRITICAL",
        }
    }

    pub fn severity_level(&self) -> u8 {
        match self {
            AlertTier::None => 0,
            AlertTier::Info => 1,
            AlertTier::Warning => 2,
            AlertTier::Critical => 3,
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            AlertTier::None => "✅",
            AlertTier::Info => "ℹ️",
            AlertTier::Warning => "⚠️",
            AlertTier::Critical => "🚨",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            AlertTier::None => "#10b981",     // Green
            AlertTier::Info => "#3b82f6",     // Blue
            AlertTier::Warning => "#f59e0b",  // Yellow
            AlertTier::Critical => "#ef4444", // Red
        }
    }

    /// Discord embed color
    pub fn color_int(&self) -> u32 {
        match self {
            AlertTier::None => 0x10b981,
            AlertTier::Info => 0x3b82f6,
            AlertTier::Warning => 0xf59e0b,
            AlertTier::Critical => 0xef4444,
        }
    }
}

impl std::fmt::Display for AlertTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_ordering() {
        assert!(AlertTier::None < AlertTier::Info);
        assert!(AlertTier::Info < AlertTier::Warning);
        assert!(AlertTier::Warning < AlertTier::Critical);
        for pair in AlertTier::ALL.windows(2) {
            assert!(pair[0].severity_level() < pair[1].severity_level());
        }
    }

    #[test]
    fn test_tier_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&AlertTier::Warning).unwrap(), "\"WARNING\"");
        let tier: AlertTier = serde_json::from_str("\"CRITICAL\"").unwrap();
        assert_eq!(tier, AlertTier::Critical);
    }
}
