//! # kasa-register: Multi-Slot Register Engine
//!
//! The stateful half of Kasa POS. Where `kasa-core` defines one session's
//! state machine, this crate holds the fixed row of slots a cashier parks
//! sales in, routes every mutation to the active slot, and drives the one
//! asynchronous step in the system: handing a finalized session to the
//! order-commit collaborator.
//!
//! ## Engine Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        kasa-register                                    │
//! │                                                                         │
//! │   RegisterState (Arc<Mutex>)                                            │
//! │   └── Register                                                          │
//! │       ├── sessions: [CartSession; N]   one state machine per slot       │
//! │       ├── active: usize                which slot the UI is editing     │
//! │       └── tax_rate: TaxRate            shared across slots              │
//! │                                                                         │
//! │   checkout(state, committer, staff)                                     │
//! │   ├── lock ─► begin_checkout: validate, mark slot pending, build draft  │
//! │   ├── (unlocked) ─► await committer.commit(draft)                       │
//! │   └── lock ─► complete_checkout (reset slot) / abort_checkout (unlock)  │
//! │                                                                         │
//! │   Collaborator seams: ProductLookup (scan), OrderCommitter (persist)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`register`] - `Register` slot manager and the `RegisterState` wrapper
//! - [`checkout`] - async checkout orchestration
//! - [`collaborators`] - traits the hosting application implements
//! - [`error`] - register and checkout error types

pub mod checkout;
pub mod collaborators;
pub mod error;
pub mod register;

pub use checkout::checkout;
pub use collaborators::{OrderCommitter, ProductLookup};
pub use error::{CheckoutError, CommitError, RegisterError};
pub use register::{PendingCheckout, Register, RegisterState, SlotSummary};
