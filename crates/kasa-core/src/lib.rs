//! # kasa-core: Pure Business Logic for Kasa POS
//!
//! This crate is the **heart** of Kasa POS. It contains the multi-slot cart
//! engine and all pricing math as pure state transitions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kasa POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     Hosting Application (UI)                    │   │
//! │  │    Catalog UI ──► Slot Tabs ──► Cart UI ──► Checkout Button    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kasa-register                                │   │
//! │  │    Register (slot manager), async checkout orchestration,      │   │
//! │  │    ProductLookup / OrderCommitter collaborator traits          │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                ★ kasa-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │ CartSession│ │ subtotal  │  │   │
//! │  │   │   Order   │  │  TaxRate  │  │  LineItem │  │ tax/total │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE STATE MACHINES      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Order, Discount, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - LineItem and CartSession (the per-slot state machine)
//! - [`pricing`] - Pure pricing calculator (subtotal, discount, tax, total)
//! - [`error`] - Domain error types
//! - [`validation`] - Input sanitizers
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every pricing function is deterministic
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid
//!    float errors
//! 4. **Explicit Errors**: Rejections (stock ceiling, locked session) are
//!    typed results, never silent no-ops and never panics
//!
//! ## Example Usage
//!
//! ```rust
//! use kasa_core::money::Money;
//! use kasa_core::types::TaxRate;
//!
//! // Create money from cents (never from floats!)
//! let price = Money::from_cents(1099); // $10.99
//!
//! // Tax on $10.99 at 8% = $0.88 (rounded)
//! let tax = price.percent_of(TaxRate::from_fraction(0.08).bps());
//! assert_eq!(tax.cents(), 88);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use kasa_core::Money` instead of
// `use kasa_core::money::Money`

pub use cart::{CartSession, LineItem};
pub use error::CartError;
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Number of independent cart slots a register holds by default.
///
/// ## Why a constant?
/// The register screen shows a fixed row of slot tabs; three parked sales
/// covers the common "customer ran back for one more item" case without
/// cluttering the UI. Hosts can pick another size via
/// `Register::with_slots`.
pub const DEFAULT_SLOT_COUNT: usize = 3;

/// Customer label used on orders when no customer is bound to the session.
pub const WALK_IN_CUSTOMER_NAME: &str = "Walk-in Customer";

/// Cost fallback ratio in basis points (7000 = 70% of sale price).
///
/// Products without a recorded cost price get their cost snapshotted at 70%
/// of the sale price, so margin reports downstream always have a figure to
/// work with.
pub const DEFAULT_COST_RATIO_BPS: u32 = 7000;
