// crates/backdrop-validation/src/formats.rs
// ============================================================================
// Module: Backdrop String Formats
// Description: Checkers for named string formats.
// Purpose: Back the engine's `format` constraint with strict parsers.
// Dependencies: time, url, uuid
// ============================================================================

//! ## Overview
//! Format checks are strict parses, not heuristics: `date-time` must be RFC
//! 3339 round-trippable, addresses must parse, URIs must be absolute. A
//! failed check is a format violation; it never panics or allocates reports
//! itself.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::net::Ipv4Addr;
use std::net::Ipv6Addr;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use url::Url;
use uuid::Uuid;

use crate::schema::StringFormat;

// ============================================================================
// SECTION: Format Dispatch
// ============================================================================

/// Checks a string against a named format.
#[must_use]
pub fn matches_format(format: StringFormat, text: &str) -> bool {
    match format {
        StringFormat::DateTime => is_date_time(text),
        StringFormat::Email => is_email(text),
        StringFormat::Hostname => is_hostname(text),
        StringFormat::Ipv4 => text.parse::<Ipv4Addr>().is_ok(),
        StringFormat::Ipv6 => text.parse::<Ipv6Addr>().is_ok(),
        StringFormat::Uri => Url::parse(text).is_ok(),
        StringFormat::Uuid => Uuid::parse_str(text).is_ok(),
    }
}

// ============================================================================
// SECTION: Individual Checkers
// ============================================================================

/// RFC 3339 date-time that survives a parse round-trip.
fn is_date_time(text: &str) -> bool {
    let Ok(parsed) = OffsetDateTime::parse(text, &Rfc3339) else {
        return false;
    };
    parsed.format(&Rfc3339).is_ok()
}

/// Minimal structural email check: one `@`, non-empty local part, and a
/// dotted domain with no whitespace.
fn is_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !local.chars().any(char::is_whitespace)
        && domain.contains('.')
        && is_hostname(domain)
}

/// DNS hostname: dot-separated labels of alphanumerics and inner hyphens,
/// each 1-63 characters, 253 characters total.
fn is_hostname(text: &str) -> bool {
    if text.is_empty() || text.len() > 253 {
        return false;
    }
    text.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
    })
}
