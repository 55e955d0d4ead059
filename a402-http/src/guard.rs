//! SSRF guard for outbound payment-flow requests.
//!
//! An agent can be handed an arbitrary URL and tricked into paying an
//! internal service or a cloud metadata endpoint. Every outbound request in
//! the payment flow is checked here first: non-HTTPS schemes and
//! loopback/link-local/metadata/private hostnames are rejected before any
//! connection is attempted.
//!
//! Matching is exact/prefix string comparison on the lowercased hostname; no
//! DNS resolution happens here.

use url::Url;

/// Hostnames that are blocked in every mode, including permissive.
static METADATA_HOSTS: &[&str] = &["169.254.169.254", "metadata.google.internal", "metadata.internal"];

/// Exact hostnames treated as local/private.
static PRIVATE_HOSTS: &[&str] = &["localhost", "0.0.0.0", "::", "::1"];

/// A URL that failed the safety check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The hostname points at a loopback, link-local, metadata, or private
    /// destination.
    #[error("destination host {host:?} is blocked")]
    BlockedDestination {
        /// The offending hostname, lowercased.
        host: String,
    },
    /// The URL scheme is not allowed for payment traffic.
    #[error("unsupported URL scheme {scheme:?}")]
    UnsupportedScheme {
        /// The offending scheme.
        scheme: String,
    },
    /// The URL has no host component at all.
    #[error("URL {url:?} has no host")]
    MissingHost {
        /// The offending URL.
        url: String,
    },
}

/// Validates outbound target URLs against SSRF risk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlGuard {
    require_https: bool,
    block_private: bool,
}

impl UrlGuard {
    /// Production policy: HTTPS only, all local and private ranges blocked.
    #[must_use]
    pub const fn strict() -> Self {
        Self {
            require_https: true,
            block_private: true,
        }
    }

    /// Development policy: plain HTTP and local addresses allowed.
    ///
    /// Metadata endpoints stay blocked even here — there is no legitimate
    /// reason to pay one.
    #[must_use]
    pub const fn permissive() -> Self {
        Self {
            require_https: false,
            block_private: false,
        }
    }

    /// Checks a target URL.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::UnsupportedScheme`] for disallowed schemes,
    /// [`GuardError::MissingHost`] for host-less URLs, and
    /// [`GuardError::BlockedDestination`] for blocked hostnames.
    pub fn check(&self, url: &Url) -> Result<(), GuardError> {
        let scheme = url.scheme();
        let scheme_ok = scheme == "https" || (!self.require_https && scheme == "http");
        if !scheme_ok {
            return Err(GuardError::UnsupportedScheme {
                scheme: scheme.to_owned(),
            });
        }

        let host = url
            .host_str()
            .ok_or_else(|| GuardError::MissingHost {
                url: url.to_string(),
            })?
            .trim_matches(['[', ']'])
            .to_ascii_lowercase();

        if METADATA_HOSTS.contains(&host.as_str()) || host.starts_with("169.254.") {
            return Err(GuardError::BlockedDestination { host });
        }

        if self.block_private && is_private_host(&host) {
            return Err(GuardError::BlockedDestination { host });
        }

        Ok(())
    }
}

impl Default for UrlGuard {
    fn default() -> Self {
        Self::strict()
    }
}

/// Classifies a lowercased hostname as loopback/private by string shape.
fn is_private_host(host: &str) -> bool {
    if PRIVATE_HOSTS.contains(&host) {
        return true;
    }
    if host.starts_with("127.") || host.starts_with("10.") || host.starts_with("192.168.") {
        return true;
    }
    // RFC1918 172.16.0.0/12: second octet 16 through 31.
    if let Some(rest) = host.strip_prefix("172.") {
        if let Some((octet, _)) = rest.split_once('.') {
            if octet.parse::<u8>().is_ok_and(|o| (16..=31).contains(&o)) {
                return true;
            }
        }
    }
    host.ends_with(".internal") || host.ends_with(".local")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(guard: UrlGuard, url: &str) -> Result<(), GuardError> {
        guard.check(&Url::parse(url).unwrap())
    }

    #[test]
    fn test_strict_allows_public_https() {
        assert!(check(UrlGuard::strict(), "https://api.example.com/paid").is_ok());
    }

    #[test]
    fn test_strict_rejects_plain_http() {
        assert!(matches!(
            check(UrlGuard::strict(), "http://api.example.com/"),
            Err(GuardError::UnsupportedScheme { .. })
        ));
    }

    #[test]
    fn test_metadata_endpoint_blocked_regardless_of_scheme_or_mode() {
        for guard in [UrlGuard::strict(), UrlGuard::permissive()] {
            for url in [
                "https://169.254.169.254/latest/meta-data/",
                "http://169.254.169.254/",
                "https://metadata.google.internal/computeMetadata/v1/",
                "https://169.254.1.1/",
            ] {
                let result = guard.check(&Url::parse(url).unwrap());
                assert!(
                    matches!(result, Err(GuardError::BlockedDestination { .. }))
                        || matches!(result, Err(GuardError::UnsupportedScheme { .. })),
                    "{url} passed in {guard:?}"
                );
            }
        }
    }

    #[test]
    fn test_strict_rejects_loopback_and_private_ranges() {
        for url in [
            "https://localhost/",
            "https://127.0.0.1/",
            "https://127.1.2.3/",
            "https://0.0.0.0/",
            "https://[::1]/",
            "https://10.0.0.5/",
            "https://172.16.0.1/",
            "https://172.31.255.255/",
            "https://192.168.1.1/",
            "https://vault.internal/",
            "https://printer.local/",
        ] {
            assert!(
                matches!(
                    check(UrlGuard::strict(), url),
                    Err(GuardError::BlockedDestination { .. })
                ),
                "{url} was not blocked"
            );
        }
    }

    #[test]
    fn test_strict_allows_non_private_172_range() {
        assert!(check(UrlGuard::strict(), "https://172.15.0.1/").is_ok());
        assert!(check(UrlGuard::strict(), "https://172.32.0.1/").is_ok());
    }

    #[test]
    fn test_permissive_allows_local_http() {
        assert!(check(UrlGuard::permissive(), "http://127.0.0.1:8080/").is_ok());
        assert!(check(UrlGuard::permissive(), "http://localhost:3000/").is_ok());
    }

    #[test]
    fn test_non_http_schemes_rejected() {
        for guard in [UrlGuard::strict(), UrlGuard::permissive()] {
            assert!(matches!(
                guard.check(&Url::parse("ftp://example.com/").unwrap()),
                Err(GuardError::UnsupportedScheme { .. })
            ));
        }
    }
}
