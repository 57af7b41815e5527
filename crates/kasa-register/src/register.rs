//! # Register (Slot Manager)
//!
//! Holds N independent cart sessions and an active-slot selector.
//!
//! ## Slot Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Register Slots                                     │
//! │                                                                         │
//! │   ┌─────────────┐  ┌─────────────┐  ┌─────────────┐                    │
//! │   │   Slot 0    │  │   Slot 1    │  │   Slot 2    │                    │
//! │   │  3 lines    │  │  (empty)    │  │  1 line     │                    │
//! │   │  "Carol"    │  │             │  │  Walk-in    │                    │
//! │   └──────┬──────┘  └─────────────┘  └─────────────┘                    │
//! │          │ active                                                       │
//! │          ▼                                                              │
//! │   add_item / update_quantity / set_customer / ... all route here;      │
//! │   the other slots persist untouched until selected.                    │
//! │                                                                         │
//! │   Switching the active slot never mutates session content.             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! One tax rate is shared across slots (it comes from the settings
//! collaborator, not from any one sale).

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use kasa_core::pricing;
use kasa_core::{
    CartSession, Customer, DiscountKind, LineItem, Money, OrderDraft, OrderStatus, Product, Staff,
    TaxRate, DEFAULT_SLOT_COUNT, WALK_IN_CUSTOMER_NAME,
};

use crate::collaborators::ProductLookup;
use crate::error::{CheckoutError, RegisterError};

// =============================================================================
// Register
// =============================================================================

/// The multi-slot register engine.
///
/// Owned by the hosting application (passed by reference/context to UI
/// layers, never an ambient global), or shared via [`RegisterState`]
/// when command handlers run concurrently.
#[derive(Debug, Clone)]
pub struct Register {
    /// Fixed-size row of sessions; never grows or shrinks after
    /// construction.
    sessions: Vec<CartSession>,

    /// Index of the session currently being edited/displayed.
    active: usize,

    /// Tax rate from the settings collaborator, shared across slots.
    tax_rate: TaxRate,
}

impl Register {
    /// Creates a register with the default three slots.
    pub fn new(tax_rate: TaxRate) -> Self {
        Register::with_slots(DEFAULT_SLOT_COUNT, tax_rate)
            .expect("default slot count is non-zero")
    }

    /// Creates a register with a custom slot count (`slots ≥ 1`).
    pub fn with_slots(slots: usize, tax_rate: TaxRate) -> Result<Self, RegisterError> {
        if !kasa_core::validation::validate_slot_count(slots) {
            return Err(RegisterError::InvalidSlotCount);
        }
        Ok(Register {
            sessions: (0..slots).map(|_| CartSession::new()).collect(),
            active: 0,
            tax_rate,
        })
    }

    // -------------------------------------------------------------------------
    // Slot selection
    // -------------------------------------------------------------------------

    /// Number of slots this register was built with.
    pub fn slot_count(&self) -> usize {
        self.sessions.len()
    }

    /// Index of the currently active slot.
    pub fn active_slot(&self) -> usize {
        self.active
    }

    /// Switches the focused session. Never mutates session content.
    ///
    /// An out-of-range index is a programming error in the caller and is
    /// reported as [`RegisterError::InvalidSlot`].
    pub fn set_active_slot(&mut self, index: usize) -> Result<(), RegisterError> {
        if index >= self.sessions.len() {
            return Err(RegisterError::InvalidSlot {
                index,
                slots: self.sessions.len(),
            });
        }
        debug!(slot = index, "active slot switched");
        self.active = index;
        Ok(())
    }

    /// Read access to any slot's session.
    pub fn session(&self, index: usize) -> Result<&CartSession, RegisterError> {
        self.sessions.get(index).ok_or(RegisterError::InvalidSlot {
            index,
            slots: self.sessions.len(),
        })
    }

    /// The session the register is currently pointed at.
    pub fn active_session(&self) -> &CartSession {
        &self.sessions[self.active]
    }

    fn active_session_mut(&mut self) -> &mut CartSession {
        &mut self.sessions[self.active]
    }

    // -------------------------------------------------------------------------
    // Settings
    // -------------------------------------------------------------------------

    /// Current tax rate.
    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    /// Updates the tax rate (settings-changed hook). Applies to every slot's
    /// totals from the next computation on.
    pub fn set_tax_rate(&mut self, rate: TaxRate) {
        debug!(bps = rate.bps(), "tax rate updated");
        self.tax_rate = rate;
    }

    // -------------------------------------------------------------------------
    // Active-session mutations
    // -------------------------------------------------------------------------
    // Thin routing to the active slot's state machine; every rejection comes
    // back as a value, state guaranteed unchanged.

    /// Adds one unit of a product to the active session.
    pub fn add_item(
        &mut self,
        product: &Product,
        variants: BTreeMap<String, String>,
    ) -> Result<(), RegisterError> {
        debug!(slot = self.active, product_id = %product.id, "add_item");
        self.active_session_mut().add_item(product, variants)?;
        Ok(())
    }

    /// Resolves a scanned code (sku or id) and adds the product.
    pub fn add_scanned(
        &mut self,
        catalog: &impl ProductLookup,
        code: &str,
    ) -> Result<(), RegisterError> {
        let product = catalog
            .resolve(code)
            .ok_or_else(|| RegisterError::ProductNotFound {
                code: code.to_string(),
            })?;
        debug!(slot = self.active, code = %code, product_id = %product.id, "scan resolved");
        self.add_item(&product, BTreeMap::new())
    }

    /// Removes a line from the active session.
    pub fn remove_item(&mut self, item_id: &str) -> Result<(), RegisterError> {
        debug!(slot = self.active, item_id = %item_id, "remove_item");
        self.active_session_mut().remove_item(item_id)?;
        Ok(())
    }

    /// Adjusts a line's quantity in the active session by a signed delta.
    pub fn update_quantity(&mut self, item_id: &str, delta: i64) -> Result<(), RegisterError> {
        debug!(slot = self.active, item_id = %item_id, delta = delta, "update_quantity");
        self.active_session_mut().update_quantity(item_id, delta)?;
        Ok(())
    }

    /// Clears the active session (staff attribution survives).
    pub fn clear(&mut self) -> Result<(), RegisterError> {
        debug!(slot = self.active, "clear");
        self.active_session_mut().clear()?;
        Ok(())
    }

    /// Binds or clears the active session's customer.
    pub fn set_customer(&mut self, customer: Option<&Customer>) -> Result<(), RegisterError> {
        self.active_session_mut().set_customer(customer)?;
        Ok(())
    }

    /// Free-text customer name on the active session.
    pub fn set_customer_name(&mut self, name: &str) -> Result<(), RegisterError> {
        self.active_session_mut().set_customer_name(name)?;
        Ok(())
    }

    /// Free-text customer phone on the active session.
    pub fn set_customer_phone(&mut self, phone: &str) -> Result<(), RegisterError> {
        self.active_session_mut().set_customer_phone(phone)?;
        Ok(())
    }

    /// Salesperson attribution on the active session.
    pub fn set_salesperson(&mut self, id: &str, name: &str) -> Result<(), RegisterError> {
        self.active_session_mut().set_salesperson(id, name)?;
        Ok(())
    }

    /// Cashier attribution on the active session.
    pub fn set_cashier(&mut self, id: &str, name: &str) -> Result<(), RegisterError> {
        self.active_session_mut().set_cashier(id, name)?;
        Ok(())
    }

    /// Discount rule on the active session, from raw UI input.
    pub fn set_discount(&mut self, kind: DiscountKind, value: f64) -> Result<(), RegisterError> {
        self.active_session_mut().set_discount(kind, value)?;
        Ok(())
    }

    /// Flips the active session's return mode.
    pub fn toggle_return_mode(&mut self) -> Result<(), RegisterError> {
        self.active_session_mut().toggle_return_mode()?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Active-session getters
    // -------------------------------------------------------------------------

    /// The active session's lines, in display order.
    pub fn items(&self) -> &[LineItem] {
        &self.active_session().items
    }

    /// Signed subtotal of the active session.
    pub fn subtotal(&self) -> Money {
        self.active_session().subtotal()
    }

    /// Clamped discount amount of the active session.
    pub fn discount_amount(&self) -> Money {
        let session = self.active_session();
        pricing::discount_amount(session.subtotal(), &session.discount)
    }

    /// Tax on the active session's discounted subtotal.
    pub fn tax(&self) -> Money {
        let session = self.active_session();
        let sub = session.subtotal();
        let disc = pricing::discount_amount(sub, &session.discount);
        pricing::tax_amount(sub, disc, self.tax_rate)
    }

    /// Grand total of the active session.
    pub fn total(&self) -> Money {
        let session = self.active_session();
        let sub = session.subtotal();
        let disc = pricing::discount_amount(sub, &session.discount);
        let tax = pricing::tax_amount(sub, disc, self.tax_rate);
        pricing::total(sub, disc, tax)
    }

    /// Full totals summary for the cart panel.
    pub fn totals(&self) -> pricing::Totals {
        self.active_session().totals(self.tax_rate)
    }

    /// Quantity of a product across the active session's lines, SALE and
    /// RETURN alike (stock-availability hint for the catalog UI).
    pub fn item_count_for_product(&self, product_id: &str) -> i64 {
        self.active_session().item_count_for_product(product_id)
    }

    /// Per-slot chips for the slot-selector row.
    pub fn slot_summaries(&self) -> Vec<SlotSummary> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(index, session)| SlotSummary {
                index,
                active: index == self.active,
                total_quantity: session.total_quantity(),
                customer_name: session.customer_name.clone(),
                checkout_pending: session.is_checkout_pending(),
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Checkout lifecycle
    // -------------------------------------------------------------------------
    // The async orchestrator in `crate::checkout` drives these three; they
    // are public so a host with its own orchestration loop can too.

    /// Validates the active session, locks it, and builds the order draft.
    ///
    /// The returned [`PendingCheckout`] records which slot was locked;
    /// completion targets that slot even if the operator switches the
    /// active slot while the commit is in flight.
    pub fn begin_checkout(&mut self, staff: &Staff) -> Result<PendingCheckout, CheckoutError> {
        let slot = self.active;
        let tax_rate = self.tax_rate;
        let session = &mut self.sessions[slot];

        session.begin_checkout().map_err(|e| match e {
            kasa_core::CartError::EmptyCart => CheckoutError::EmptyCart,
            _ => CheckoutError::AlreadyPending,
        })?;

        let totals = session.totals(tax_rate);
        let draft = OrderDraft {
            items: session.items.clone(),
            subtotal: totals.subtotal,
            discount_amount: totals.discount_amount,
            discount: session.discount,
            tax_amount: totals.tax_amount,
            total_amount: totals.total_amount,
            status: OrderStatus::Completed,
            customer_id: session.customer_id.clone(),
            customer_name: if session.customer_name.is_empty() {
                WALK_IN_CUSTOMER_NAME.to_string()
            } else {
                session.customer_name.clone()
            },
            salesperson_id: session
                .salesperson_id
                .clone()
                .or_else(|| Some(staff.id.clone())),
            salesperson_name: session
                .salesperson_name
                .clone()
                .or_else(|| Some(staff.name.clone())),
            cashier_id: session.cashier_id.clone().or_else(|| Some(staff.id.clone())),
            cashier_name: session
                .cashier_name
                .clone()
                .or_else(|| Some(staff.name.clone())),
            created_at: Utc::now(),
        };

        Ok(PendingCheckout { slot, draft })
    }

    /// Commit succeeded: reset the recorded slot, staff attribution intact.
    pub fn complete_checkout(&mut self, slot: usize) {
        if let Some(session) = self.sessions.get_mut(slot) {
            session.complete_checkout();
        }
    }

    /// Commit failed: unlock the recorded slot with content untouched.
    pub fn abort_checkout(&mut self, slot: usize) {
        if let Some(session) = self.sessions.get_mut(slot) {
            session.abort_checkout();
        }
    }
}

impl Default for Register {
    fn default() -> Self {
        Register::new(TaxRate::zero())
    }
}

// =============================================================================
// Slot Summary
// =============================================================================

/// One chip in the slot-selector row.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotSummary {
    pub index: usize,
    pub active: bool,
    pub total_quantity: i64,
    /// Empty when no customer is captured; the UI renders its own
    /// "Walk-in" placeholder.
    pub customer_name: String,
    pub checkout_pending: bool,
}

// =============================================================================
// Pending Checkout
// =============================================================================

/// A locked slot plus the draft built from it, produced by
/// [`Register::begin_checkout`] and consumed by the orchestrator.
#[derive(Debug, Clone)]
pub struct PendingCheckout {
    /// The slot that was locked; completion and abort target this slot.
    pub slot: usize,
    /// The payload for the order-commit collaborator.
    pub draft: OrderDraft,
}

// =============================================================================
// Register State (shared ownership wrapper)
// =============================================================================

/// Thread-safe wrapper for hosts whose command handlers run concurrently.
///
/// ## Why Mutex (not RwLock)?
/// Register operations are quick and most of them mutate; the lock is never
/// held across the checkout await (the orchestrator re-acquires it after
/// the commit resolves).
#[derive(Debug)]
pub struct RegisterState {
    register: Arc<Mutex<Register>>,
}

impl RegisterState {
    /// Wraps a register for shared ownership.
    pub fn new(register: Register) -> Self {
        RegisterState {
            register: Arc::new(Mutex::new(register)),
        }
    }

    /// Executes a function with read access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let totals = state.with_register(|r| r.totals());
    /// ```
    pub fn with_register<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Register) -> R,
    {
        let register = self.register.lock().expect("register mutex poisoned");
        f(&register)
    }

    /// Executes a function with write access to the register.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// state.with_register_mut(|r| r.add_item(&product, variants))?;
    /// ```
    pub fn with_register_mut<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Register) -> R,
    {
        let mut register = self.register.lock().expect("register mutex poisoned");
        f(&mut register)
    }
}

impl Default for RegisterState {
    fn default() -> Self {
        RegisterState::new(Register::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            sku: format!("SKU-{}", id),
            name: format!("Product {}", id),
            price_cents,
            cost_price_cents: None,
            stock,
            image_url: None,
        }
    }

    struct MemoryCatalog(Vec<Product>);

    impl ProductLookup for MemoryCatalog {
        fn resolve(&self, code: &str) -> Option<Product> {
            self.0
                .iter()
                .find(|p| p.sku == code || p.id == code)
                .cloned()
        }
    }

    #[test]
    fn test_register_starts_empty_on_slot_zero() {
        let register = Register::new(TaxRate::from_fraction(0.08));
        assert_eq!(register.slot_count(), 3);
        assert_eq!(register.active_slot(), 0);
        assert!(register.active_session().is_empty());
    }

    #[test]
    fn test_with_slots_rejects_zero() {
        assert_eq!(
            Register::with_slots(0, TaxRate::zero()).unwrap_err(),
            RegisterError::InvalidSlotCount
        );
    }

    #[test]
    fn test_invalid_slot_index() {
        let mut register = Register::new(TaxRate::zero());
        assert_eq!(
            register.set_active_slot(3),
            Err(RegisterError::InvalidSlot { index: 3, slots: 3 })
        );
        // Selection is unchanged after the rejection
        assert_eq!(register.active_slot(), 0);
    }

    #[test]
    fn test_slot_isolation() {
        let mut register = Register::new(TaxRate::from_fraction(0.08));
        let p = product("1", 1000, 10);

        // Build slot 0, then park it and look at slot 1
        register.add_item(&p, BTreeMap::new()).unwrap();
        register.set_active_slot(1).unwrap();

        assert!(register.items().is_empty());
        assert_eq!(register.total().cents(), 0);

        // Mutating slot 1 leaves slot 0 alone
        register.add_item(&product("2", 500, 10), BTreeMap::new()).unwrap();
        assert_eq!(register.session(0).unwrap().line_count(), 1);
        assert_eq!(register.session(0).unwrap().items[0].product_id, "1");

        // Switching back reveals slot 0 exactly as parked
        register.set_active_slot(0).unwrap();
        assert_eq!(register.items().len(), 1);
        assert_eq!(register.subtotal().cents(), 1000);
    }

    #[test]
    fn test_getter_surface_tracks_active_slot() {
        let mut register = Register::new(TaxRate::from_fraction(0.08));
        let p = product("1", 10000, 10);

        register.add_item(&p, BTreeMap::new()).unwrap();
        register.set_discount(DiscountKind::Fixed, 10.0).unwrap();

        assert_eq!(register.subtotal().cents(), 10000);
        assert_eq!(register.discount_amount().cents(), 1000);
        assert_eq!(register.tax().cents(), 720);
        assert_eq!(register.total().cents(), 9720);
        assert_eq!(register.item_count_for_product("1"), 1);
    }

    #[test]
    fn test_tax_rate_shared_across_slots() {
        let mut register = Register::new(TaxRate::from_fraction(0.08));
        let p = product("1", 10000, 10);
        register.add_item(&p, BTreeMap::new()).unwrap();

        register.set_tax_rate(TaxRate::from_fraction(0.10));
        assert_eq!(register.tax().cents(), 1000);
    }

    #[test]
    fn test_scan_resolves_sku_then_id() {
        let catalog = MemoryCatalog(vec![product("p1", 500, 5), product("p2", 700, 5)]);
        let mut register = Register::new(TaxRate::zero());

        register.add_scanned(&catalog, "SKU-p1").unwrap();
        register.add_scanned(&catalog, "p2").unwrap();
        assert_eq!(register.items().len(), 2);

        assert_eq!(
            register.add_scanned(&catalog, "nope"),
            Err(RegisterError::ProductNotFound {
                code: "nope".to_string()
            })
        );
    }

    #[test]
    fn test_slot_summaries() {
        let mut register = Register::new(TaxRate::zero());
        let p = product("1", 500, 10);
        register.add_item(&p, BTreeMap::new()).unwrap();
        register.add_item(&p, BTreeMap::new()).unwrap();
        register.set_customer_name("Carol").unwrap();
        register.set_active_slot(2).unwrap();

        let summaries = register.slot_summaries();
        assert_eq!(summaries.len(), 3);
        assert_eq!(summaries[0].total_quantity, 2);
        assert_eq!(summaries[0].customer_name, "Carol");
        assert!(!summaries[0].active);
        assert!(summaries[2].active);
        assert_eq!(summaries[2].total_quantity, 0);
    }

    #[test]
    fn test_begin_checkout_builds_walk_in_draft() {
        let mut register = Register::new(TaxRate::from_fraction(0.08));
        let p = product("1", 10000, 10);
        register.add_item(&p, BTreeMap::new()).unwrap();

        let staff = Staff {
            id: "u1".to_string(),
            name: "Alice".to_string(),
        };
        let pending = register.begin_checkout(&staff).unwrap();

        assert_eq!(pending.slot, 0);
        assert_eq!(pending.draft.customer_name, WALK_IN_CUSTOMER_NAME);
        assert_eq!(pending.draft.status, OrderStatus::Completed);
        assert_eq!(pending.draft.total_amount.cents(), 10800);
        // Unset session attribution falls back to the staff context
        assert_eq!(pending.draft.salesperson_name.as_deref(), Some("Alice"));
        assert_eq!(pending.draft.cashier_id.as_deref(), Some("u1"));
    }

    #[test]
    fn test_session_attribution_beats_staff_fallback() {
        let mut register = Register::new(TaxRate::zero());
        let p = product("1", 500, 10);
        register.add_item(&p, BTreeMap::new()).unwrap();
        register.set_salesperson("s9", "Sam").unwrap();

        let staff = Staff {
            id: "u1".to_string(),
            name: "Alice".to_string(),
        };
        let pending = register.begin_checkout(&staff).unwrap();

        assert_eq!(pending.draft.salesperson_name.as_deref(), Some("Sam"));
        // Cashier was never set on the session, so the operator fills in
        assert_eq!(pending.draft.cashier_name.as_deref(), Some("Alice"));
    }

    #[test]
    fn test_complete_checkout_targets_recorded_slot() {
        let mut register = Register::new(TaxRate::zero());
        let p = product("1", 500, 10);
        register.add_item(&p, BTreeMap::new()).unwrap();

        let staff = Staff {
            id: "u1".to_string(),
            name: "Alice".to_string(),
        };
        let pending = register.begin_checkout(&staff).unwrap();

        // Operator wanders to slot 1 and starts another sale mid-commit
        register.set_active_slot(1).unwrap();
        register.add_item(&product("2", 700, 5), BTreeMap::new()).unwrap();

        register.complete_checkout(pending.slot);

        // Slot 0 reset, slot 1 untouched
        assert!(register.session(0).unwrap().is_empty());
        assert_eq!(register.session(1).unwrap().line_count(), 1);
    }
}
