//! # Collaborator Traits
//!
//! The seams where the engine meets the rest of the POS. The hosting
//! application implements these against its actual persistence and hardware
//! stack; the engine only ever sees the trait.
//!
//! Inventory adjustment and stock-log writing happen behind
//! [`OrderCommitter`]: the engine's stock ceilings are advisory snapshots,
//! never the authoritative decrement.

use async_trait::async_trait;

use kasa_core::{Order, OrderDraft, Product};

use crate::error::CommitError;

/// Resolves a scanned barcode or typed code against the product catalog.
///
/// Scan hardware and decoding are out of scope; by the time a code reaches
/// the engine it is a plain string matched against sku or id.
pub trait ProductLookup {
    /// Returns the product whose sku or id equals `code`, if any.
    fn resolve(&self, code: &str) -> Option<Product>;
}

/// Persists a finalized order and performs the inventory side effects.
///
/// The engine treats a commit as atomic: either a canonical order (with a
/// server-assigned id) comes back, or nothing happened and the session can
/// be retried unchanged.
#[async_trait]
pub trait OrderCommitter: Send + Sync {
    /// Commits the draft, returning the canonical order record.
    async fn commit(&self, draft: OrderDraft) -> Result<Order, CommitError>;
}
