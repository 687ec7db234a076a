//! Identity derivation from screenshot URLs.
//!
//! An identity is the key used to find or create an asset node: the URL's
//! host, classified as an IP or a hostname.
//!
//! Key functions:
//! - `resolve()` - Derives the identity of a URL
//! - `Identity::search_expression()` - Query string for the graph search endpoint

use serde_json::{json, Value};
use thiserror::Error;

/// Stable lookup key for an asset node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    /// Value made of digits and dots only.
    Ip(String),
    /// Anything else.
    Hostname(String),
}

/// Raised when a URL yields no usable identity.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    #[error("No host or path could be derived from URL '{0}'")]
    /// Nothing usable in the URL
    Empty(String),
}

impl Identity {
    /// Classifies a host value.
    ///
    /// Anything that is only digits once dots are removed is an IP, even when
    /// it is not a valid dotted quad (`1.2.3`, `12345`).
    pub fn classify(value: &str) -> Self {
        let digits: String = value.chars().filter(|c| *c != '.').collect();
        if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) {
            Identity::Ip(value.to_string())
        } else {
            Identity::Hostname(value.to_string())
        }
    }

    /// Raw host value.
    pub fn value(&self) -> &str {
        match self {
            Identity::Ip(v) | Identity::Hostname(v) => v,
        }
    }

    /// True for the `Ip` variant.
    pub fn is_ip(&self) -> bool {
        matches!(self, Identity::Ip(_))
    }

    /// Graph search expression (`ip == 10.0.0.5`, `hostname == "example.com"`).
    pub fn search_expression(&self) -> String {
        match self {
            Identity::Ip(v) => format!("ip == {v}"),
            Identity::Hostname(v) => format!("hostname == \"{v}\""),
        }
    }

    /// Partial node payload used when the asset does not exist yet.
    pub fn creation_payload(&self) -> Value {
        match self {
            Identity::Ip(v) => json!({ "ip": v }),
            Identity::Hostname(v) => json!({ "hostname": v }),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.value())
    }
}

/// Derives the identity of a screenshot URL.
///
/// Uses the host as written in the URL. Numeric hosts are never normalized:
/// `http://1.2.3/` yields `Ip("1.2.3")`, not the WHATWG reading `1.2.0.3`,
/// and hosts the URL parser rejects (`999.999.999.999`) are kept verbatim.
/// Without a host, falls back to the path component of the raw text, so
/// `"example.com/login"` still yields a value instead of an error.
///
/// # Errors
///
/// Returns `IdentityError::Empty` when neither a host nor a path is present
/// (e.g. `"https://"`).
pub fn resolve(url: &str) -> Result<Identity, IdentityError> {
    let value = match url::Url::parse(url) {
        Ok(parsed) => match parsed.host() {
            Some(url::Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
            Some(url::Host::Ipv4(ip)) => raw_host(url).unwrap_or_else(|| ip.to_string()),
            Some(url::Host::Ipv6(ip)) => ip.to_string(),
            _ => parsed.path().to_string(),
        },
        Err(_) => raw_host(url).unwrap_or_else(|| fallback_path(url).to_string()),
    };

    let value = value.trim();
    if value.is_empty() {
        return Err(IdentityError::Empty(url.to_string()));
    }
    Ok(Identity::classify(value))
}

/// Host exactly as written between `scheme://` and the path, lowercased.
///
/// Userinfo and port are dropped, IPv6 brackets removed. `None` when there is
/// no scheme prefix or the netloc holds no host.
fn raw_host(raw: &str) -> Option<String> {
    let (scheme, rest) = raw.trim().split_once("://")?;
    if !is_scheme(scheme) {
        return None;
    }

    let netloc = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = netloc.rsplit_once('@').map_or(netloc, |(_, host)| host);
    let host = match host_port.strip_prefix('[') {
        Some(bracketed) => bracketed.split(']').next().unwrap_or_default(),
        None => host_port.split(':').next().unwrap_or_default(),
    };

    let host = host.trim();
    (!host.is_empty()).then(|| host.to_lowercase())
}

/// Path component of text without a usable host.
///
/// Splits `scheme://netloc/path?query#fragment` generically: the netloc is
/// dropped when a scheme prefix is present, the query and fragment always.
fn fallback_path(raw: &str) -> &str {
    let without_suffix = raw.split(['?', '#']).next().unwrap_or_default();

    match without_suffix.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => match rest.find('/') {
            Some(idx) => &rest[idx..],
            None => "",
        },
        _ => without_suffix,
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
