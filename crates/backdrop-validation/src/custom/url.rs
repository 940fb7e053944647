// crates/backdrop-validation/src/custom/url.rs
// ============================================================================
// Module: Backdrop URL Validator
// Description: URL policy checks for scenario-supplied links and images.
// Purpose: Restrict protocols, enforce HTTPS, and gate image sources.
// Dependencies: crate::{custom, result}, serde_json, url
// ============================================================================

//! ## Overview
//! URLs in scenario documents can point anywhere; policy decides where the
//! client may actually go. The validator restricts schemes, optionally
//! requires HTTPS, blocks listed domains, and verifies image URLs by
//! extension plus an optional host allowlist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde_json::Value;
use serde_json::json;
use url::Url;

use crate::custom::CustomValidator;
use crate::result::Severity;
use crate::result::ValidationIssue;
use crate::result::ValidationResult;

// ============================================================================
// SECTION: Issue Codes
// ============================================================================

/// String is not a parseable absolute URL.
pub const CODE_URL_INVALID: &str = "URL_INVALID";
/// URL scheme is outside the allowlist.
pub const CODE_URL_SCHEME_BLOCKED: &str = "URL_SCHEME_BLOCKED";
/// Cleartext URL where HTTPS is required.
pub const CODE_URL_INSECURE: &str = "URL_INSECURE";
/// URL host is on the blocklist.
pub const CODE_URL_DOMAIN_BLOCKED: &str = "URL_DOMAIN_BLOCKED";
/// Image URL has an unexpected extension.
pub const CODE_URL_IMAGE_EXTENSION: &str = "URL_IMAGE_EXTENSION";
/// Image URL host is outside the image allowlist.
pub const CODE_URL_IMAGE_HOST: &str = "URL_IMAGE_HOST";

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// URL policy configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlValidatorConfig {
    /// Accepted URL schemes.
    pub allowed_schemes: BTreeSet<String>,
    /// Require HTTPS for http-family URLs.
    pub require_https: bool,
    /// Hosts that are never accepted (subdomains included).
    pub blocked_domains: BTreeSet<String>,
    /// Accepted image file extensions, lowercase without the dot.
    pub image_extensions: BTreeSet<String>,
    /// Optional allowlist of image hosts; `None` accepts any host.
    pub image_host_allowlist: Option<BTreeSet<String>>,
}

impl Default for UrlValidatorConfig {
    fn default() -> Self {
        Self {
            allowed_schemes: ["http", "https"].iter().map(ToString::to_string).collect(),
            require_https: false,
            blocked_domains: BTreeSet::new(),
            image_extensions: ["png", "jpg", "jpeg", "gif", "webp", "svg"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            image_host_allowlist: None,
        }
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// URL policy validator.
#[derive(Debug, Clone, Default)]
pub struct UrlValidator {
    /// Policy configuration.
    config: UrlValidatorConfig,
}

impl UrlValidator {
    /// Creates a validator with the given policy.
    #[must_use]
    pub const fn new(config: UrlValidatorConfig) -> Self {
        Self {
            config,
        }
    }

    /// Validates a single URL string against the policy.
    #[must_use]
    pub fn validate_url(&self, text: &str, path: &str) -> ValidationResult {
        let mut result = ValidationResult::valid();
        let Ok(parsed) = Url::parse(text) else {
            result.push(ValidationIssue::new(
                CODE_URL_INVALID,
                format!("not an absolute URL: {text}"),
                path,
                Severity::Error,
            ));
            return result;
        };
        let scheme = parsed.scheme();
        if !self.config.allowed_schemes.contains(scheme) {
            result.push(
                ValidationIssue::new(
                    CODE_URL_SCHEME_BLOCKED,
                    format!("scheme `{scheme}` is not allowed"),
                    path,
                    Severity::Error,
                )
                .with_details(json!({"scheme": scheme})),
            );
        }
        if self.config.require_https && scheme == "http" {
            result.push(ValidationIssue::new(
                CODE_URL_INSECURE,
                "cleartext http is not allowed".to_string(),
                path,
                Severity::Error,
            ));
        }
        if let Some(host) = parsed.host_str()
            && self.is_blocked_host(host)
        {
            result.push(ValidationIssue::new(
                CODE_URL_DOMAIN_BLOCKED,
                format!("host `{host}` is blocked"),
                path,
                Severity::Error,
            ));
        }
        result
    }

    /// Validates an image URL: policy checks plus extension and host gates.
    #[must_use]
    pub fn validate_image_url(&self, text: &str, path: &str) -> ValidationResult {
        let mut result = self.validate_url(text, path);
        let Ok(parsed) = Url::parse(text) else {
            return result;
        };
        let extension = parsed
            .path()
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !self.config.image_extensions.contains(&extension) {
            result.push(ValidationIssue::new(
                CODE_URL_IMAGE_EXTENSION,
                format!("image extension `{extension}` is not accepted"),
                path,
                Severity::Error,
            ));
        }
        if let Some(allowlist) = &self.config.image_host_allowlist {
            let host = parsed.host_str().unwrap_or_default();
            if !allowlist.contains(host) {
                result.push(ValidationIssue::new(
                    CODE_URL_IMAGE_HOST,
                    format!("image host `{host}` is not on the allowlist"),
                    path,
                    Severity::Error,
                ));
            }
        }
        result
    }

    /// Blocklist check including subdomains.
    fn is_blocked_host(&self, host: &str) -> bool {
        self.config
            .blocked_domains
            .iter()
            .any(|blocked| host == blocked || host.ends_with(&format!(".{blocked}")))
    }
}

impl CustomValidator for UrlValidator {
    fn name(&self) -> &str {
        "url"
    }

    fn validate(&self, value: &Value, path: &str) -> ValidationResult {
        match value {
            Value::String(text) => self.validate_url(text, path),
            _ => ValidationResult::failure(ValidationIssue::new(
                CODE_URL_INVALID,
                "expected a URL string".to_string(),
                path,
                Severity::Error,
            )),
        }
    }
}
