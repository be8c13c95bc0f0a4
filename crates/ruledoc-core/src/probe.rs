//! Help-link lookups used by the link-check report.
//!
//! The lookup is injectable through [`LinkProbe`] so the report can be
//! produced offline. [`HttpLinkProbe`] is the live implementation.

use crate::config::LinkCheckConfig;

use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::Policy;
use reqwest::{Client, StatusCode, Url};
use tracing::debug;

/// Why a help link failed the check. The message is the report detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LinkError {
    /// The rule declares no help link.
    #[error("Missing help link URI")]
    MissingUri,

    /// The help link is not an absolute `http` or `https` URI.
    #[error("Invalid help link URI: {uri}")]
    InvalidUri {
        /// Declared link.
        uri: String,
    },

    /// The server answered with a non-success status.
    #[error("Invalid response ({status}) for link URI: {uri}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Requested link.
        uri: String,
    },

    /// The server redirected somewhere other than the same page.
    #[error("Unexpected redirect ({status}) to {location} for link URI: {uri}")]
    Redirect {
        /// Response status.
        status: StatusCode,
        /// Redirect target, empty when the response had no `Location`.
        location: String,
        /// Requested link.
        uri: String,
    },

    /// The request never produced a response.
    #[error("Request failed for link URI: {uri}: {message}")]
    Transport {
        /// Requested link.
        uri: String,
        /// Transport error text.
        message: String,
    },
}

/// Looks up one help link.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    /// Returns `Ok(())` when the link resolves to a working page.
    ///
    /// # Errors
    ///
    /// Returns the reason the link is considered broken.
    async fn probe(&self, url: &Url) -> Result<(), LinkError>;
}

/// Validates a declared help link and probes it.
///
/// Missing and malformed links are reported without calling the probe.
///
/// # Errors
///
/// Returns the reason the link is considered broken.
pub async fn check_help_link(probe: &dyn LinkProbe, link: Option<&str>) -> Result<(), LinkError> {
    let Some(link) = link.filter(|l| !l.is_empty()) else {
        return Err(LinkError::MissingUri);
    };
    let url = match Url::parse(link) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        _ => {
            return Err(LinkError::InvalidUri {
                uri: link.to_string(),
            })
        }
    };
    probe.probe(&url).await
}

/// Live probe issuing `GET` requests without following redirects.
#[derive(Debug, Clone)]
pub struct HttpLinkProbe {
    client: Client,
    follow_trailing_slash: bool,
}

impl HttpLinkProbe {
    /// Builds the HTTP client from the link-check settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(config: &LinkCheckConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .redirect(Policy::none())
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            follow_trailing_slash: config.follow_trailing_slash,
        })
    }
}

/// Returns `true` if two URLs only differ by a trailing slash.
fn same_modulo_trailing_slash(a: &Url, b: &Url) -> bool {
    a.as_str().trim_end_matches('/') == b.as_str().trim_end_matches('/')
}

#[async_trait]
impl LinkProbe for HttpLinkProbe {
    async fn probe(&self, url: &Url) -> Result<(), LinkError> {
        debug!("Checking {url}");
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| LinkError::Transport {
                uri: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        if status.is_redirection() {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let target = url.join(&location).ok();
            if self.follow_trailing_slash
                && target.is_some_and(|t| same_modulo_trailing_slash(url, &t))
            {
                return Ok(());
            }
            return Err(LinkError::Redirect {
                status,
                location,
                uri: url.to_string(),
            });
        }

        Err(LinkError::Status {
            status,
            uri: url.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProbe {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LinkProbe for CountingProbe {
        async fn probe(&self, _url: &Url) -> Result<(), LinkError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn missing_link_is_not_probed() {
        let probe = CountingProbe::default();
        assert_eq!(check_help_link(&probe, None).await, Err(LinkError::MissingUri));
        assert_eq!(check_help_link(&probe, Some("")).await, Err(LinkError::MissingUri));
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn relative_and_non_http_links_are_invalid() {
        let probe = CountingProbe::default();
        for link in ["docs/CT1001.md", "mailto:team@example.com", "not a uri"] {
            let err = check_help_link(&probe, Some(link)).await.unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid help link URI: {link}"));
        }
        assert_eq!(probe.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn absolute_link_is_probed() {
        let probe = CountingProbe::default();
        check_help_link(&probe, Some("https://example.com/CT1001"))
            .await
            .unwrap();
        assert_eq!(probe.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn trailing_slash_comparison() {
        let a = Url::parse("https://example.com/rules/CT1001").unwrap();
        let b = Url::parse("https://example.com/rules/CT1001/").unwrap();
        let c = Url::parse("https://example.com/other").unwrap();
        assert!(same_modulo_trailing_slash(&a, &b));
        assert!(!same_modulo_trailing_slash(&a, &c));
    }

    #[test]
    fn error_messages() {
        let err = LinkError::Status {
            status: StatusCode::NOT_FOUND,
            uri: "https://example.com/x".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid response (404 Not Found) for link URI: https://example.com/x"
        );

        let err = LinkError::Redirect {
            status: StatusCode::MOVED_PERMANENTLY,
            location: "https://example.com/y".into(),
            uri: "https://example.com/x".into(),
        };
        assert_eq!(
            err.to_string(),
            "Unexpected redirect (301 Moved Permanently) to https://example.com/y for link URI: https://example.com/x"
        );
    }

    #[test]
    fn http_probe_builds_from_config() {
        assert!(HttpLinkProbe::new(&LinkCheckConfig::default()).is_ok());
    }
}
