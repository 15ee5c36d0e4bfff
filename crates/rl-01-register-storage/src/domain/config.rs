//! Storage configuration.

/// Configuration for register storage.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Largest single encoded record accepted (default: 4 MiB).
    pub max_record_bytes: usize,

    /// Registers a tenant may own (default: 10,000).
    pub max_registers_per_tenant: usize,

    /// Dockets returned by one range read (default: 1,000).
    pub max_dockets_per_read: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_record_bytes: 4 * 1024 * 1024,
            max_registers_per_tenant: 10_000,
            max_dockets_per_read: 1_000,
        }
    }
}
