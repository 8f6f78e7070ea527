//! Process-wide runtime settings

use std::sync::OnceLock;

use crate::error::{ArrayError, Result};

/// Settings shared by every array in the process.
///
/// Install them once at startup with [`init_array_runtime`]. Until that
/// happens (or if it never does) the [`Default`] values apply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArrayConfig {
    /// Maximum nesting depth for `equal`, `same`, `compare` and serialization
    /// before they fail with [`ArrayError::RecursionLimit`].
    pub recursion_limit: usize,
    /// Whether reading a missing key emits an "Undefined index" notice.
    pub missing_key_notices: bool,
    /// Shard count for the scalar array cache. Must be a power of two greater
    /// than one; `None` uses the dashmap default.
    pub scalar_cache_shards: Option<usize>,
}

impl Default for ArrayConfig {
    fn default() -> Self {
        Self {
            recursion_limit: 512,
            missing_key_notices: true,
            scalar_cache_shards: None,
        }
    }
}

static CONFIG: OnceLock<ArrayConfig> = OnceLock::new();

/// Installs the process-wide configuration.
///
/// Fails with [`ArrayError::AlreadyInitialized`] if a configuration was
/// already installed, or if any array operation already read the defaults.
pub fn init_array_runtime(config: ArrayConfig) -> Result<()> {
    CONFIG
        .set(config)
        .map_err(|_| ArrayError::AlreadyInitialized)
}

pub(crate) fn config() -> &'static ArrayConfig {
    CONFIG.get_or_init(ArrayConfig::default)
}
