//! OAuth credential state for authenticated providers
//!
//! Adapters for providers behind OAuth 2.0 carry one of these. The refresh
//! itself is a stateless exchange against the provider's token endpoint;
//! this type only decides *when* a refresh is due and records that one
//! happened, so the host knows to persist the rotated tokens.
use chrono::{DateTime, Duration, Utc};

/// Refresh this long before the stored expiry.
const REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// A stored OAuth token pair with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthCredential {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    refreshed: bool,
}

/// Result of a token refresh exchange.
///
/// Providers may or may not rotate the refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenRefresh {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl OAuthCredential {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_at: DateTime<Utc>,
    ) -> Self {
        OAuthCredential {
            access_token,
            refresh_token,
            expires_at,
            refreshed: false,
        }
    }

    /// Whether the access token is expired or inside the safety margin.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - now <= Duration::seconds(REFRESH_MARGIN_SECS)
    }

    /// Install refreshed tokens and flag the credential as dirty.
    pub fn apply(&mut self, refresh: TokenRefresh) {
        self.access_token = refresh.access_token;
        if let Some(refresh_token) = refresh.refresh_token {
            self.refresh_token = refresh_token;
        }
        self.expires_at = refresh.expires_at;
        self.refreshed = true;
    }

    /// True once [`OAuthCredential::apply`] ran; the host should persist the
    /// updated tokens when it sees this.
    pub fn was_refreshed(&self) -> bool {
        self.refreshed
    }
}
