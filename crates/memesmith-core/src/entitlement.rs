//! Premium feature gating.

use crate::types::UserProfile;

/// How a render request is paid for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    /// Nothing premium was requested.
    Free,
    /// Covered by pro status.
    Pro,
    /// Allowed, but one credit must be spent once the render succeeds.
    SpendCredit,
    /// Premium was requested and the user can't pay for it.
    Denied,
}

impl Entitlement {
    /// Decides how a request is paid for.
    ///
    /// `profile` is `None` for anonymous callers, who only get free renders.
    pub fn check(profile: Option<&UserProfile>, wants_premium: bool) -> Self {
        if !wants_premium {
            return Entitlement::Free;
        }
        match profile {
            Some(p) if p.is_pro => Entitlement::Pro,
            Some(p) if p.credits > 0 => Entitlement::SpendCredit,
            _ => Entitlement::Denied,
        }
    }

    /// Whether the request may proceed.
    pub fn is_allowed(self) -> bool {
        !matches!(self, Entitlement::Denied)
    }
}
