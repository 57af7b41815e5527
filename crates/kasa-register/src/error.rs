//! # Register Error Types
//!
//! Error types for slot management and checkout orchestration.
//!
//! ## Propagation Policy
//! Cart-level rejections (stock ceilings, locked sessions) stay result
//! values all the way up; they are expected conditions the UI flashes a
//! warning for. Checkout failures are the infrequent kind that need user
//! attention (network down, server-side validation), so they propagate as
//! `Err` from the orchestrator with the session left exactly as it was.

use thiserror::Error;

use kasa_core::CartError;

// =============================================================================
// Register Error
// =============================================================================

/// Errors from slot selection, scan resolution and active-session mutation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// Slot index outside the register's fixed range. This is a programming
    /// error in the caller, not a user-facing condition.
    #[error("slot index {index} out of range (register has {slots} slots)")]
    InvalidSlot { index: usize, slots: usize },

    /// A register cannot be built without at least one slot.
    #[error("a register needs at least one slot")]
    InvalidSlotCount,

    /// No catalog product matches a scanned code (sku or id).
    #[error("no product matches scanned code: {code}")]
    ProductNotFound { code: String },

    /// A session-level rejection, passed through unchanged.
    #[error(transparent)]
    Cart(#[from] CartError),
}

// =============================================================================
// Commit Error
// =============================================================================

/// Failure shapes the order-commit collaborator can report.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// The collaborator refused the order (server-side validation).
    #[error("order rejected: {reason}")]
    Rejected { reason: String },

    /// The collaborator could not be reached or failed mid-flight.
    #[error("order commit transport failed: {0}")]
    Transport(String),
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Errors from the checkout orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Checkout attempted with zero line items; the collaborator is never
    /// called.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The active slot already has a commit in flight.
    #[error("a checkout is already in flight for this slot")]
    AlreadyPending,

    /// The collaborator rejected or failed; the session is untouched and
    /// the operator can retry.
    #[error("order commit failed: {0}")]
    Commit(#[from] CommitError),
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = RegisterError::InvalidSlot { index: 7, slots: 3 };
        assert_eq!(
            err.to_string(),
            "slot index 7 out of range (register has 3 slots)"
        );

        let err = CheckoutError::Commit(CommitError::Transport("connection reset".to_string()));
        assert_eq!(
            err.to_string(),
            "order commit failed: order commit transport failed: connection reset"
        );
    }

    #[test]
    fn test_cart_error_passes_through() {
        let err: RegisterError = CartError::EmptyCart.into();
        assert_eq!(err.to_string(), "cannot check out an empty cart");
    }
}
