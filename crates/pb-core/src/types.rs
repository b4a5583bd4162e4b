//! Common types used throughout Pulseboard.

use serde::{Deserialize, Serialize};

/// Color representation (for activity categories, statuses)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Color {
    /// Hex color code (e.g. "#FF0000")
    pub hex: String,
    /// Human-readable name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Color {
    pub fn new(hex: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            name: None,
        }
    }

    pub fn with_name(hex: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            hex: hex.into(),
            name: Some(name.into()),
        }
    }

    /// Loose hex sanity check used by category validation
    pub fn is_valid_hex(&self) -> bool {
        let hex = self.hex.as_str();
        hex.starts_with('#')
            && matches!(hex.len(), 4 | 7)
            && hex[1..].chars().all(|c| c.is_ascii_hexdigit())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self {
            hex: "#4A6FA5".to_string(),
            name: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_validation() {
        assert!(Color::new("#fff").is_valid_hex());
        assert!(Color::new("#A1B2C3").is_valid_hex());
        assert!(!Color::new("A1B2C3").is_valid_hex());
        assert!(!Color::new("#A1B2C").is_valid_hex());
        assert!(!Color::new("#GGGGGG").is_valid_hex());
    }
}
