//! # Error Types
//!
//! Domain-specific error types for kasa-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kasa-core errors (this file)                                          │
//! │  └── CartError      - Session mutation rejections                      │
//! │                                                                         │
//! │  kasa-register errors (separate crate)                                 │
//! │  ├── RegisterError  - Slot selection, scan resolution                  │
//! │  └── CheckoutError  - Orchestration and commit failures                │
//! │                                                                         │
//! │  Flow: CartError → RegisterError/CheckoutError → Hosting app           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product id, quantities)
//! 3. Errors are enum variants, never String
//! 4. Rejections leave session state COMPLETELY unchanged; a caller that
//!    receives an `Err` can trust nothing moved

use thiserror::Error;

// =============================================================================
// Cart Error
// =============================================================================

/// Session mutation rejections.
///
/// These are expected, frequent conditions (a cashier bumping into a stock
/// ceiling dozens of times a day), so they are returned as values for the UI
/// to flash a warning on. Never panics, and state is never partially
/// mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Attempted SALE quantity beyond available stock.
    ///
    /// ## When This Occurs
    /// - `add_item` would push a merged SALE line past the product's
    ///   current stock
    /// - `update_quantity` would push a SALE line past its add-time
    ///   stock ceiling
    ///
    /// The ceiling is advisory (another terminal may sell the same stock);
    /// the order-commit collaborator owns the authoritative check.
    #[error("insufficient stock for product {product_id}: available {available}, requested {requested}")]
    StockExceeded {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// `update_quantity` would drive a line to zero or below.
    ///
    /// Lines are only ever removed via `remove_item`; quantity edits floor
    /// at 1 and report this rejection instead of auto-removing.
    #[error("quantity must stay positive, requested {requested}")]
    QuantityNotPositive { requested: i64 },

    /// The referenced line does not exist in this session.
    #[error("line item not found: {item_id}")]
    LineNotFound { item_id: String },

    /// Checkout was attempted on a session with no line items. No external
    /// call is made.
    #[error("cannot check out an empty cart")]
    EmptyCart,

    /// The session has an in-flight checkout; content mutations are refused
    /// until the commit resolves.
    #[error("session is locked by an in-flight checkout")]
    CheckoutPending,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CartError.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CartError::StockExceeded {
            product_id: "prod-42".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "insufficient stock for product prod-42: available 3, requested 5"
        );

        let err = CartError::QuantityNotPositive { requested: 0 };
        assert_eq!(err.to_string(), "quantity must stay positive, requested 0");
    }
}
