//! Registry configuration.

/// Configuration for an expectation registry.
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Tool name printed in the missed-race banner.
    pub tool_name: String,

    /// Hard cap on arena slots (0 = unbounded). Exceeding a nonzero cap
    /// aborts the process.
    pub max_records: usize,

    /// Slots to pre-reserve in the arena.
    pub initial_capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            tool_name: "expectrace".to_string(),
            max_records: 0,
            initial_capacity: 64,
        }
    }
}

impl RegistryConfig {
    /// Builder pattern: set the tool name used in diagnostics.
    pub fn with_tool_name(mut self, name: impl Into<String>) -> Self {
        self.tool_name = name.into();
        self
    }

    /// Builder pattern: cap the number of records ever carved out.
    pub fn with_max_records(mut self, max: usize) -> Self {
        self.max_records = max;
        self
    }

    /// Builder pattern: pre-reserve arena capacity.
    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RegistryConfig::default();
        assert_eq!(config.tool_name, "expectrace");
        assert_eq!(config.max_records, 0);
    }

    #[test]
    fn test_builder() {
        let config = RegistryConfig::default()
            .with_tool_name("mydetector")
            .with_max_records(1024)
            .with_initial_capacity(16);
        assert_eq!(config.tool_name, "mydetector");
        assert_eq!(config.max_records, 1024);
        assert_eq!(config.initial_capacity, 16);
    }
}
