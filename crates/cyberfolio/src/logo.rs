//! Certificate issuer logos.
//!
//! A logo is looked up by guessing the issuer's domain, then falls back to
//! the logo stored on the certificate, then to a fixed placeholder.

use std::fmt;
use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::content::Cert;

/// Logo-by-domain service.
pub const LOGO_SERVICE: &str = "https://logo.clearbit.com";

/// Shown when nothing else loads.
pub const PLACEHOLDER_LOGO: &str = "https://placehold.co/64x64/ffffff/000000?text=Logo";

static PARENTHETICAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(.*\)").expect("Invalid regex pattern"));

/// Guess an issuer's web domain: `"CompTIA"` becomes `"comptia.com"`.
///
/// Lower-cases, drops spaces, periods, commas and anything in parentheses.
#[must_use]
pub fn issuer_domain(issuer: &str) -> String {
    let compact: String = issuer
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, ' ' | '.' | ','))
        .collect();
    format!("{}.com", PARENTHETICAL.replace_all(&compact, ""))
}

/// Logo URLs to try for `cert`, best first.
#[must_use]
pub fn logo_candidates(cert: &Cert) -> Vec<String> {
    let mut candidates = vec![format!("{LOGO_SERVICE}/{}", issuer_domain(&cert.issuer))];
    if !cert.logo.trim().is_empty() {
        candidates.push(cert.logo.clone());
    }
    candidates.push(PLACEHOLDER_LOGO.to_string());
    candidates
}

/// Checks whether a logo URL actually loads.
#[async_trait]
pub trait LogoChecker: Send + Sync + fmt::Debug {
    /// Whether `url` serves something usable.
    async fn accepts(&self, url: &str) -> bool;
}

/// Pick the first candidate for `cert` that `checker` accepts.
///
/// The placeholder is returned when no candidate is accepted.
pub async fn resolve_logo(cert: &Cert, checker: &dyn LogoChecker) -> String {
    for candidate in logo_candidates(cert) {
        if candidate == PLACEHOLDER_LOGO || checker.accepts(&candidate).await {
            debug!(issuer = %cert.issuer, logo = %candidate, "Resolved logo");
            return candidate;
        }
    }
    PLACEHOLDER_LOGO.to_string()
}

/// Resolve logos for every cert, in order.
pub async fn resolve_logos(certs: &[Cert], checker: &dyn LogoChecker) -> Vec<String> {
    let mut logos = Vec::with_capacity(certs.len());
    for cert in certs {
        logos.push(resolve_logo(cert, checker).await);
    }
    logos
}

/// Checks with a `HEAD` request; any 2xx counts.
#[derive(Debug, Clone)]
pub struct HttpChecker {
    agent: ureq::Agent,
}

impl HttpChecker {
    /// Create a checker with a request timeout.
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

#[async_trait]
impl LogoChecker for HttpChecker {
    async fn accepts(&self, url: &str) -> bool {
        let agent = self.agent.clone();
        let url = url.to_string();
        tokio::task::spawn_blocking(move || agent.head(&url).call().is_ok())
            .await
            .unwrap_or(false)
    }
}

/// Accepts nothing, for offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineChecker;

#[async_trait]
impl LogoChecker for OfflineChecker {
    async fn accepts(&self, _url: &str) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts URLs containing a marker.
    #[derive(Debug)]
    struct MarkerChecker(&'static str);

    #[async_trait]
    impl LogoChecker for MarkerChecker {
        async fn accepts(&self, url: &str) -> bool {
            url.contains(self.0)
        }
    }

    fn cert(issuer: &str, logo: &str) -> Cert {
        Cert {
            name: "Cert".to_string(),
            issuer: issuer.to_string(),
            logo: logo.to_string(),
            image_url: String::new(),
            verify_url: String::new(),
        }
    }

    #[test]
    fn test_issuer_domain() {
        assert_eq!(issuer_domain("CompTIA"), "comptia.com");
        assert_eq!(issuer_domain("Offensive Security"), "offensivesecurity.com");
        assert_eq!(issuer_domain("EC-Council, Inc."), "ec-councilinc.com");
        assert_eq!(issuer_domain("INE (eLearnSecurity)"), "ine.com");
    }

    #[test]
    fn test_candidates_order() {
        let candidates = logo_candidates(&cert("INE", "https://cdn.example/ine.png"));
        assert_eq!(
            candidates,
            vec![
                "https://logo.clearbit.com/ine.com".to_string(),
                "https://cdn.example/ine.png".to_string(),
                PLACEHOLDER_LOGO.to_string(),
            ]
        );
    }

    #[test]
    fn test_blank_stored_logo_is_skipped() {
        let candidates = logo_candidates(&cert("INE", " "));
        assert_eq!(candidates.len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_prefers_domain_logo() {
        let stored = cert("CompTIA", "https://cdn.example/x.png");
        let logo = resolve_logo(&stored, &MarkerChecker("clearbit")).await;
        assert_eq!(logo, "https://logo.clearbit.com/comptia.com");
    }

    #[tokio::test]
    async fn test_resolve_falls_back_to_stored_then_placeholder() {
        let stored = cert("CompTIA", "https://cdn.example/x.png");
        assert_eq!(
            resolve_logo(&stored, &MarkerChecker("cdn.example")).await,
            "https://cdn.example/x.png"
        );
        assert_eq!(resolve_logo(&stored, &OfflineChecker).await, PLACEHOLDER_LOGO);
    }

    #[tokio::test]
    async fn test_resolve_logos_keeps_order() {
        let certs = vec![cert("A", ""), cert("B", "")];
        let logos = resolve_logos(&certs, &MarkerChecker("b.com")).await;
        assert_eq!(
            logos,
            vec![
                PLACEHOLDER_LOGO.to_string(),
                "https://logo.clearbit.com/b.com".to_string()
            ]
        );
    }
}
