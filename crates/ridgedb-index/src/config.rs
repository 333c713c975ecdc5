//! Index layer configuration.
//!
//! [`IndexConfig`] can be built in code or deserialized from any serde
//! format; every field has a default.
//!
//! ```
//! use ridgedb_index::{HashLength, IndexConfig};
//!
//! let config = IndexConfig::new().hash_keys(Some(HashLength::Short)).batch_size(500);
//! assert_eq!(config.batch.batch_size, 500);
//!
//! let parsed: IndexConfig = serde_json::from_str(r#"{"string_suffix": "_raw"}"#).unwrap();
//! assert_eq!(parsed.string_suffix, "_raw");
//! assert_eq!(parsed.raw_query_prefix, "v.");
//! ```

use serde::{Deserialize, Serialize};

/// Length of the digest prefix placed in front of composite index keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashLength {
    /// 4 bytes.
    Short,
    /// 8 bytes.
    Long,
}

impl HashLength {
    /// Number of digest bytes in the prefix.
    #[must_use]
    pub const fn bytes(self) -> usize {
        match self {
            Self::Short => 4,
            Self::Long => 8,
        }
    }
}

/// Configuration for bulk index batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of pending updates that triggers a flush.
    /// Default: 1000 updates.
    pub batch_size: usize,

    /// Free memory percentage at or below which a flush is forced.
    /// Default: 10 percent.
    pub min_free_memory_percent: u8,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { batch_size: 1000, min_free_memory_percent: 10 }
    }
}

/// Configuration for index maintenance and query translation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Digest prefix for composite keys. Default: none.
    pub hash_keys: Option<HashLength>,

    /// Marker in raw query strings that precedes a key name.
    /// Default: `"v."`.
    pub raw_query_prefix: String,

    /// Replacement for the `*` key in raw query strings.
    /// Default: `"*"`.
    pub wildcard_field: String,

    /// Suffix of the exact-match sub-field of dual-mode string fields.
    /// Default: `"__STRING"`.
    pub string_suffix: String,

    /// Bulk batch settings.
    pub batch: BatchConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            hash_keys: None,
            raw_query_prefix: "v.".to_owned(),
            wildcard_field: "*".to_owned(),
            string_suffix: "__STRING".to_owned(),
            batch: BatchConfig::default(),
        }
    }
}

impl IndexConfig {
    /// Create a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the composite key digest prefix.
    #[must_use]
    pub const fn hash_keys(mut self, hash: Option<HashLength>) -> Self {
        self.hash_keys = hash;
        self
    }

    /// Set the raw query key marker.
    #[must_use]
    pub fn raw_query_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.raw_query_prefix = prefix.into();
        self
    }

    /// Set the dual-mode exact sub-field suffix.
    #[must_use]
    pub fn string_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.string_suffix = suffix.into();
        self
    }

    /// Set the bulk batch size.
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch.batch_size = size;
        self
    }

    /// Set the free memory threshold that forces a flush.
    #[must_use]
    pub const fn min_free_memory_percent(mut self, percent: u8) -> Self {
        self.batch.min_free_memory_percent = percent;
        self
    }
}
