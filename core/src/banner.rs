//! Single-slot error banner with token-guarded expiry.
//!
//! Every `raise` and `dismiss` advances a monotonic token. A scheduled
//! auto-clear carries the token it was issued for and only clears the banner
//! when that token is still current, so an old timer can never clear a newer
//! message.

use crate::error::ErrorKind;

/// Identifies one raise of the banner.
pub type BannerToken = u64;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBanner {
    current: Option<ErrorKind>,
    token: BannerToken,
}

impl ErrorBanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ErrorKind> {
        self.current
    }

    pub fn message(&self) -> Option<&'static str> {
        self.current.map(ErrorKind::message)
    }

    /// Show `kind`, replacing whatever was showing. Returns the token the
    /// auto-clear for this raise must present.
    pub fn raise(&mut self, kind: ErrorKind) -> BannerToken {
        self.token += 1;
        self.current = Some(kind);
        self.token
    }

    /// Clear now and invalidate every outstanding auto-clear.
    pub fn dismiss(&mut self) {
        self.token += 1;
        self.current = None;
    }

    /// Auto-clear for `token`. Returns whether the banner changed.
    pub fn expire(&mut self, token: BannerToken) -> bool {
        if token != self.token || self.current.is_none() {
            return false;
        }
        self.current = None;
        true
    }
}
