//! Product and shop moderation rules.
//!
//! ```text
//! create ──> pending ──approve──> approved <──toggle──> out_of_stock
//!               │                    │                       │
//!               └──────soft delete───┴───────────────────────┴──> deleted
//! ```
//!
//! `deleted` is terminal. Soft-delete leaves `approved` untouched, which is
//! why customer listings check the deletion marker separately.

use thiserror::Error;

use crate::models::ProductStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProductState {
    pub approved: bool,
    pub status: ProductStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Approve,
    ToggleStock,
    MarkOutOfStock,
    MarkAvailable,
    SoftDelete,
}

impl Transition {
    pub fn action(&self) -> &'static str {
        match self {
            Transition::Approve => "product_approve",
            Transition::ToggleStock => "product_toggle_stock",
            Transition::MarkOutOfStock => "product_out_of_stock",
            Transition::MarkAvailable => "product_available",
            Transition::SoftDelete => "product_delete",
        }
    }

    /// Map a legacy `status` value sent on a product edit to a transition.
    /// Approval is never reachable this way.
    pub fn from_requested_status(status: ProductStatus) -> Option<Self> {
        match status {
            ProductStatus::Deleted => Some(Transition::SoftDelete),
            ProductStatus::OutOfStock => Some(Transition::MarkOutOfStock),
            ProductStatus::Approved => Some(Transition::MarkAvailable),
            ProductStatus::Pending => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModerationError {
    #[error("product is deleted")]
    Deleted,
    #[error("cannot {action} a product that is {status}")]
    NotAllowed {
        action: &'static str,
        status: ProductStatus,
    },
}

impl ProductState {
    /// Every product enters here regardless of what the submitter sent.
    pub const fn initial() -> Self {
        Self {
            approved: false,
            status: ProductStatus::Pending,
        }
    }

    pub fn new(approved: bool, status: ProductStatus) -> Self {
        Self { approved, status }
    }

    pub fn apply(self, transition: Transition) -> Result<Self, ModerationError> {
        use ProductStatus::*;

        if self.status == Deleted {
            return match transition {
                Transition::SoftDelete => Ok(self),
                _ => Err(ModerationError::Deleted),
            };
        }

        match (transition, self.status) {
            (Transition::Approve, _) => Ok(Self::new(true, Approved)),
            (Transition::SoftDelete, _) => Ok(Self::new(self.approved, Deleted)),

            (Transition::ToggleStock, Approved) => Ok(Self::new(self.approved, OutOfStock)),
            (Transition::ToggleStock, OutOfStock) => Ok(Self::new(self.approved, Approved)),

            (Transition::MarkOutOfStock, Approved | OutOfStock) => {
                Ok(Self::new(self.approved, OutOfStock))
            }
            (Transition::MarkAvailable, Approved | OutOfStock) => {
                Ok(Self::new(self.approved, Approved))
            }

            (Transition::ToggleStock, status)
            | (Transition::MarkOutOfStock, status)
            | (Transition::MarkAvailable, status) => Err(ModerationError::NotAllowed {
                action: "change stock of",
                status,
            }),
        }
    }
}

/// Initial moderation flags for a new shop: live immediately, not verified.
pub const SHOP_INITIAL_APPROVED: bool = true;
pub const SHOP_INITIAL_VERIFIED: bool = false;

#[cfg(test)]
mod tests {
    use super::*;
    use ProductStatus::*;

    #[test]
    fn creation_is_always_pending() {
        assert_eq!(ProductState::initial(), ProductState::new(false, Pending));
    }

    #[test]
    fn approve_is_idempotent() {
        let once = ProductState::initial().apply(Transition::Approve).unwrap();
        let twice = once.apply(Transition::Approve).unwrap();
        assert_eq!(once, ProductState::new(true, Approved));
        assert_eq!(once, twice);
    }

    #[test]
    fn approve_relists_out_of_stock() {
        let state = ProductState::new(true, OutOfStock).apply(Transition::Approve).unwrap();
        assert_eq!(state, ProductState::new(true, Approved));
    }

    #[test]
    fn stock_toggles_between_live_states() {
        let live = ProductState::new(true, Approved);
        let out = live.apply(Transition::ToggleStock).unwrap();
        assert_eq!(out.status, OutOfStock);
        assert!(out.approved);
        assert_eq!(out.apply(Transition::ToggleStock).unwrap(), live);
    }

    #[test]
    fn pending_products_have_no_stock_state() {
        let err = ProductState::initial()
            .apply(Transition::ToggleStock)
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotAllowed { status: Pending, .. }));
    }

    #[test]
    fn soft_delete_keeps_approval() {
        let deleted = ProductState::new(true, Approved)
            .apply(Transition::SoftDelete)
            .unwrap();
        assert_eq!(deleted, ProductState::new(true, Deleted));
    }

    #[test]
    fn deleted_is_terminal() {
        let deleted = ProductState::new(true, Deleted);
        for transition in [
            Transition::Approve,
            Transition::ToggleStock,
            Transition::MarkAvailable,
            Transition::MarkOutOfStock,
        ] {
            assert_eq!(deleted.apply(transition), Err(ModerationError::Deleted));
        }
        assert_eq!(deleted.apply(Transition::SoftDelete), Ok(deleted));
    }

    #[test]
    fn requested_status_never_approves() {
        assert_eq!(Transition::from_requested_status(Pending), None);
        assert_eq!(
            Transition::from_requested_status(Approved),
            Some(Transition::MarkAvailable)
        );
        let err = ProductState::initial()
            .apply(Transition::MarkAvailable)
            .unwrap_err();
        assert!(matches!(err, ModerationError::NotAllowed { .. }));
    }
}
