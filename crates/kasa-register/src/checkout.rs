//! # Checkout Orchestrator
//!
//! Drives the one asynchronous step in the engine: the order-commit await.
//!
//! ## Commit Protocol
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Checkout Protocol                                   │
//! │                                                                         │
//! │  1. LOCK ──► begin_checkout (active slot)                               │
//! │     ├── empty cart? ─► Err(EmptyCart), collaborator never called        │
//! │     ├── already pending? ─► Err(AlreadyPending)                         │
//! │     └── mark slot pending, copy items, compute totals ─► OrderDraft     │
//! │                                                                         │
//! │  2. UNLOCKED ──► await committer.commit(draft)                          │
//! │     While the commit is in flight the locked slot refuses every         │
//! │     content mutation (CartError::CheckoutPending); the other slots      │
//! │     stay fully editable.                                                │
//! │                                                                         │
//! │  3. LOCK ──► resolve                                                    │
//! │     ├── Ok(order)  ─► complete_checkout(recorded slot): reset to        │
//! │     │                 empty, staff attribution preserved                │
//! │     └── Err        ─► abort_checkout: unlock, content untouched,        │
//! │                       operator retries without re-entering items        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Completion targets the slot recorded at step 1, not whatever slot is
//! active when the commit resolves, so switching slots mid-commit can never
//! clear the wrong cart.

use tracing::{debug, info, warn};

use kasa_core::{Order, Staff};

use crate::collaborators::OrderCommitter;
use crate::error::CheckoutError;
use crate::register::{PendingCheckout, RegisterState};

/// Checks out the active slot against the order-commit collaborator.
///
/// On success the committed order (with its server-assigned id) comes back
/// and the slot is reset; on any failure the slot's content is exactly as
/// the operator left it.
pub async fn checkout<C>(
    register: &RegisterState,
    committer: &C,
    staff: &Staff,
) -> Result<Order, CheckoutError>
where
    C: OrderCommitter + ?Sized,
{
    let PendingCheckout { slot, draft } =
        register.with_register_mut(|r| r.begin_checkout(staff))?;

    debug!(
        slot = slot,
        lines = draft.items.len(),
        total = %draft.total_amount,
        "checkout started"
    );

    match committer.commit(draft).await {
        Ok(order) => {
            register.with_register_mut(|r| r.complete_checkout(slot));
            info!(order_id = %order.id, slot = slot, total = %order.draft.total_amount, "order committed");
            Ok(order)
        }
        Err(err) => {
            register.with_register_mut(|r| r.abort_checkout(slot));
            warn!(slot = slot, error = %err, "order commit failed, session kept for retry");
            Err(CheckoutError::Commit(err))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommitError;
    use crate::register::Register;

    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use kasa_core::{DiscountKind, Money, OrderDraft, Product, TaxRate};

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

    fn staff() -> Staff {
        Staff {
            id: "u1".to_string(),
            name: "Alice".to_string(),
        }
    }

    /// Counts commits and answers with a fixed id, or a transport failure
    /// when told to.
    struct ScriptedCommitter {
        calls: AtomicUsize,
        fail: bool,
    }

    impl ScriptedCommitter {
        fn succeeding() -> Self {
            ScriptedCommitter {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            ScriptedCommitter {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderCommitter for ScriptedCommitter {
        async fn commit(&self, draft: OrderDraft) -> Result<Order, CommitError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(CommitError::Transport("connection reset".to_string()))
            } else {
                Ok(Order::committed("order-1", draft))
            }
        }
    }

    /// Parks every commit until the test releases the gate, so the test can
    /// observe the engine mid-flight.
    struct GatedCommitter {
        gate: Notify,
    }

    #[async_trait]
    impl OrderCommitter for GatedCommitter {
        async fn commit(&self, draft: OrderDraft) -> Result<Order, CommitError> {
            self.gate.notified().await;
            Ok(Order::committed("order-9", draft))
        }
    }

    #[tokio::test]
    async fn test_empty_checkout_never_calls_committer() {
        let state = RegisterState::new(Register::new(TaxRate::zero()));
        let committer = ScriptedCommitter::succeeding();

        let result = checkout(&state, &committer, &staff()).await;

        assert!(matches!(result, Err(CheckoutError::EmptyCart)));
        assert_eq!(committer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_successful_checkout_resets_slot_preserving_staff() {
        let state = RegisterState::new(Register::new(TaxRate::from_fraction(0.08)));
        state.with_register_mut(|r| {
            r.set_salesperson("s1", "Alice").unwrap();
            r.add_item(&product("1", 10000, 10), BTreeMap::new()).unwrap();
            r.set_discount(DiscountKind::Fixed, 10.0).unwrap();
        });

        let committer = ScriptedCommitter::succeeding();
        let order = checkout(&state, &committer, &staff()).await.unwrap();

        assert_eq!(order.id, "order-1");
        assert_eq!(order.draft.subtotal, Money::from_cents(10000));
        assert_eq!(order.draft.discount_amount, Money::from_cents(1000));
        assert_eq!(order.draft.tax_amount, Money::from_cents(720));
        assert_eq!(order.draft.total_amount, Money::from_cents(9720));

        state.with_register(|r| {
            let session = r.session(0).unwrap();
            assert!(session.is_empty());
            assert_eq!(session.discount, kasa_core::Discount::none());
            // Staff attribution survives the reset
            assert_eq!(session.salesperson_name.as_deref(), Some("Alice"));
        });
    }

    #[tokio::test]
    async fn test_failed_commit_leaves_session_untouched() {
        let state = RegisterState::new(Register::new(TaxRate::zero()));
        state.with_register_mut(|r| {
            r.add_item(&product("1", 500, 10), BTreeMap::new()).unwrap();
            r.set_customer_name("Carol").unwrap();
            r.set_discount(DiscountKind::Percent, 5.0).unwrap();
        });
        let before = state.with_register(|r| r.session(0).unwrap().clone());

        let committer = ScriptedCommitter::failing();
        let result = checkout(&state, &committer, &staff()).await;

        assert!(matches!(
            result,
            Err(CheckoutError::Commit(CommitError::Transport(_)))
        ));
        assert_eq!(committer.call_count(), 1);

        state.with_register(|r| {
            let session = r.session(0).unwrap();
            assert!(!session.is_checkout_pending());
            assert_eq!(session.items.len(), before.items.len());
            assert_eq!(session.items[0].id, before.items[0].id);
            assert_eq!(session.customer_name, before.customer_name);
            assert_eq!(session.discount, before.discount);
        });
    }

    #[tokio::test]
    async fn test_in_flight_checkout_locks_slot_but_not_others() {
        let state = Arc::new(RegisterState::new(Register::new(TaxRate::zero())));
        state.with_register_mut(|r| {
            r.add_item(&product("1", 500, 10), BTreeMap::new()).unwrap()
        });

        let committer = Arc::new(GatedCommitter {
            gate: Notify::new(),
        });

        let task_state = state.clone();
        let task_committer = committer.clone();
        let handle = tokio::spawn(async move {
            checkout(task_state.as_ref(), task_committer.as_ref(), &staff()).await
        });

        // Wait until the orchestrator has locked the slot
        while !state.with_register(|r| r.session(0).unwrap().is_checkout_pending()) {
            tokio::task::yield_now().await;
        }

        // The slot being committed refuses mutation...
        let denied = state.with_register_mut(|r| r.add_item(&product("1", 500, 10), BTreeMap::new()));
        assert!(matches!(
            denied,
            Err(crate::error::RegisterError::Cart(
                kasa_core::CartError::CheckoutPending
            ))
        ));

        // ...while the other slots keep working
        state.with_register_mut(|r| {
            r.set_active_slot(1).unwrap();
            r.add_item(&product("2", 700, 5), BTreeMap::new()).unwrap();
        });

        committer.gate.notify_one();
        let order = handle.await.unwrap().unwrap();
        assert_eq!(order.id, "order-9");

        state.with_register(|r| {
            assert!(r.session(0).unwrap().is_empty());
            assert_eq!(r.session(1).unwrap().line_count(), 1);
        });
    }

    #[tokio::test]
    async fn test_checkout_resets_recorded_slot_after_switch() {
        let state = Arc::new(RegisterState::new(Register::new(TaxRate::zero())));
        state.with_register_mut(|r| {
            r.add_item(&product("1", 500, 10), BTreeMap::new()).unwrap()
        });

        let committer = Arc::new(GatedCommitter {
            gate: Notify::new(),
        });

        let task_state = state.clone();
        let task_committer = committer.clone();
        let handle = tokio::spawn(async move {
            checkout(task_state.as_ref(), task_committer.as_ref(), &staff()).await
        });

        while !state.with_register(|r| r.session(0).unwrap().is_checkout_pending()) {
            tokio::task::yield_now().await;
        }

        // Operator parks the sale and works slot 2 during the commit
        state.with_register_mut(|r| {
            r.set_active_slot(2).unwrap();
            r.add_item(&product("3", 300, 5), BTreeMap::new()).unwrap();
        });

        committer.gate.notify_one();
        handle.await.unwrap().unwrap();

        state.with_register(|r| {
            // The committed slot reset even though slot 2 is active now
            assert!(r.session(0).unwrap().is_empty());
            assert_eq!(r.active_slot(), 2);
            assert_eq!(r.session(2).unwrap().line_count(), 1);
        });
    }
}
