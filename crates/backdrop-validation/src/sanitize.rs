// crates/backdrop-validation/src/sanitize.rs
// ============================================================================
// Module: Backdrop Input Sanitizer
// Description: Strips markup and script vectors from inbound strings.
// Purpose: Neutralize HTML, script URLs, and event-handler attributes.
// Dependencies: regex, serde_json
// ============================================================================

//! ## Overview
//! Sanitization is the lenient sibling of the security validator: instead of
//! rejecting a value, it rewrites strings in place: `<script>` blocks and
//! HTML tags are removed, `javascript:` URLs blanked, `on*=` attributes
//! dropped.
//! Each family is individually configurable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use regex::Regex;
use serde_json::Value;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Sanitizer toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SanitizerConfig {
    /// Remove `<script>` blocks and all other HTML tags.
    pub strip_html: bool,
    /// Blank `javascript:` URLs.
    pub strip_script_urls: bool,
    /// Drop `on*=` event-handler attributes.
    pub strip_event_handlers: bool,
}

impl Default for SanitizerConfig {
    fn default() -> Self {
        Self {
            strip_html: true,
            strip_script_urls: true,
            strip_event_handlers: true,
        }
    }
}

// ============================================================================
// SECTION: Sanitizer
// ============================================================================

/// Inbound string sanitizer.
pub struct InputSanitizer {
    /// Sanitizer toggles.
    config: SanitizerConfig,
    /// `<script>...</script>` blocks.
    script_blocks: Option<Regex>,
    /// Any remaining HTML tag.
    tags: Option<Regex>,
    /// `javascript:` URL prefixes.
    script_urls: Option<Regex>,
    /// `on*=` event-handler attributes.
    event_handlers: Option<Regex>,
}

impl InputSanitizer {
    /// Creates a sanitizer with the given toggles.
    #[must_use]
    pub fn new(config: SanitizerConfig) -> Self {
        Self {
            config,
            script_blocks: Regex::new(r"(?is)<\s*script[^>]*>.*?<\s*/\s*script\s*>").ok(),
            tags: Regex::new(r"<[^>]+>").ok(),
            script_urls: Regex::new(r"(?i)javascript\s*:").ok(),
            event_handlers: Regex::new(r#"(?i)\bon[a-z]+\s*=\s*("[^"]*"|'[^']*'|[^\s>]+)"#).ok(),
        }
    }

    /// Sanitizes one string per the configured toggles.
    #[must_use]
    pub fn sanitize_text(&self, text: &str) -> String {
        let mut out = text.to_string();
        if self.config.strip_event_handlers
            && let Some(regex) = &self.event_handlers
        {
            out = regex.replace_all(&out, "").into_owned();
        }
        if self.config.strip_html {
            if let Some(regex) = &self.script_blocks {
                out = regex.replace_all(&out, "").into_owned();
            }
            if let Some(regex) = &self.tags {
                out = regex.replace_all(&out, "").into_owned();
            }
        }
        if self.config.strip_script_urls
            && let Some(regex) = &self.script_urls
        {
            out = regex.replace_all(&out, "").into_owned();
        }
        out
    }

    /// Sanitizes every string in a JSON tree, keys included.
    #[must_use]
    pub fn sanitize_value(&self, value: &Value) -> Value {
        match value {
            Value::String(text) => Value::String(self.sanitize_text(text)),
            Value::Array(items) => {
                Value::Array(items.iter().map(|item| self.sanitize_value(item)).collect())
            }
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, item)| (self.sanitize_text(key), self.sanitize_value(item)))
                    .collect(),
            ),
            other => other.clone(),
        }
    }
}

impl Default for InputSanitizer {
    fn default() -> Self {
        Self::new(SanitizerConfig::default())
    }
}
