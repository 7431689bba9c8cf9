//! Process-wide registry lifecycle.
//!
//! One registry per process, constructed by an explicit [`init`] call so
//! there is no hidden static-construction ordering to get wrong. There is
//! no teardown: the registry lives for the process, and a final
//! [`reconcile_and_clear`] is how accumulated state is flushed.

use std::sync::OnceLock;

use crate::config::RegistryConfig;
use crate::registry::ExpectationRegistry;

static REGISTRY: OnceLock<ExpectationRegistry> = OnceLock::new();

/// Initialize the process-wide registry with default configuration.
///
/// Must run before any other global operation. The first call wins;
/// later calls are no-ops.
pub fn init() {
    init_with(RegistryConfig::default());
}

/// Initialize the process-wide registry with `config`.
pub fn init_with(config: RegistryConfig) {
    let _ = REGISTRY.set(ExpectationRegistry::new(config));
}

/// Whether [`init`] has run.
pub fn is_initialized() -> bool {
    REGISTRY.get().is_some()
}

/// The process-wide registry.
///
/// # Panics
///
/// Panics if called before [`init`]; operating on an uninitialized
/// registry is a caller bug.
pub fn registry() -> &'static ExpectationRegistry {
    match REGISTRY.get() {
        Some(registry) => registry,
        None => panic!("expectrace: init() must be called before any registry operation"),
    }
}

/// Register an expected race on the process-wide registry.
pub fn register(addr: usize, file: &'static str, line: u32, desc: Option<&str>) {
    registry().register(addr, file, line, desc);
}

/// Hit-test the process-wide registry. `true` means suppress the report.
pub fn hit_test(addr: usize) -> bool {
    registry().hit_test(addr)
}

/// Drain the process-wide registry, reporting expectations never hit.
pub fn reconcile_and_clear() {
    registry().reconcile_and_clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The process-wide registry is shared by every test in this binary,
    // so all global-lifecycle coverage lives in this one test.
    #[test]
    fn test_global_lifecycle() {
        assert!(!is_initialized());
        init();
        assert!(is_initialized());

        // Second init is a no-op, not a replacement
        init_with(RegistryConfig::default().with_tool_name("other"));

        register(0xbeef_0000, "global.rs", 1, Some("global flow"));
        assert!(hit_test(0xbeef_0000));
        assert!(!hit_test(0xbeef_0008));

        crate::expect_race!(0xbeef_0010usize, "macro flow");
        assert_eq!(registry().hit_count(0xbeef_0010), Some(0));
        assert!(hit_test(0xbeef_0010));

        reconcile_and_clear();
        assert!(registry().is_empty());
    }
}
