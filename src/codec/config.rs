// Decoder limits
//
// Hostile input can claim huge lengths or nest deeply while staying small on
// the wire. Every decode runs against a `DecodeLimits`; exceeding one is
// reported as `InvalidEncoding`.

use serde::{Deserialize, Serialize};

/// Bounds applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecodeLimits {
    /// Maximum nesting of arrays, maps, records and unions
    pub max_depth: usize,
    /// Maximum number of items in one array or map, summed over its blocks
    pub max_block_items: usize,
    /// Maximum length of a single bytes or string value
    pub max_bytes_len: usize,
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_depth: 128,
            max_block_items: 1 << 24,
            max_bytes_len: 1 << 30,
        }
    }
}

impl DecodeLimits {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_max_block_items(mut self, max_block_items: usize) -> Self {
        self.max_block_items = max_block_items;
        self
    }

    pub fn with_max_bytes_len(mut self, max_bytes_len: usize) -> Self {
        self.max_bytes_len = max_bytes_len;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let limits = DecodeLimits::default();
        assert_eq!(limits.max_depth, 128);
        assert_eq!(limits.max_block_items, 1 << 24);
        assert_eq!(limits.max_bytes_len, 1 << 30);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let limits: DecodeLimits = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(limits, DecodeLimits::default().with_max_depth(8));
    }
}
