//! Runtime flag parsing.
//!
//! Detectors pass their options as a single string of whitespace-separated
//! boolean flags, with or without a leading `--` and an optional `=0`/`=1`
//! value. The registry itself performs no gating; callers check
//! [`Flags::enable_annotations`] before invoking annotation processing.

/// Runtime flags consulted by the embedding detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// Whether annotation processing is enabled at all.
    pub enable_annotations: bool,
}

impl Default for Flags {
    fn default() -> Self {
        Self {
            enable_annotations: false,
        }
    }
}

impl Flags {
    /// Parse an option string on top of the defaults.
    pub fn parse(options: &str) -> Self {
        let mut flags = Self::default();
        flags.apply(options);
        flags
    }

    /// Apply an option string to existing flags.
    ///
    /// Unrecognized options and malformed values are ignored.
    pub fn apply(&mut self, options: &str) {
        for option in options.split_whitespace() {
            let option = option.strip_prefix("--").unwrap_or(option);
            // A bare flag name means enabled
            let (name, value) = match option.split_once('=') {
                Some((name, value)) => (name, value),
                None => (option, "1"),
            };
            let Some(value) = parse_bool(value) else {
                continue;
            };
            match name {
                "enable_annotations" => self.enable_annotations = value,
                _ => {}
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
