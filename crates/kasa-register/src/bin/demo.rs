//! # Register Demo
//!
//! Drives the engine end-to-end against an in-memory catalog and a stub
//! order committer, printing the committed order as JSON.
//!
//! ## Usage
//! ```bash
//! cargo run -p kasa-register --bin demo
//!
//! # With operation-level logs
//! RUST_LOG=debug cargo run -p kasa-register --bin demo
//! ```
//!
//! ## Script
//! - Slot 0: two sodas (merged line) and a bag of chips, $1 off
//! - Slot 1: a parked return for a walk-in customer
//! - Checkout of slot 0, then back to slot 1 to show it untouched

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use kasa_core::{DiscountKind, Order, OrderDraft, Product, Staff, TaxRate};
use kasa_register::{
    checkout, CommitError, OrderCommitter, ProductLookup, Register, RegisterState,
};

/// Fixed catalog slice standing in for the product-lookup collaborator.
struct MemoryCatalog(Vec<Product>);

impl ProductLookup for MemoryCatalog {
    fn resolve(&self, code: &str) -> Option<Product> {
        self.0
            .iter()
            .find(|p| p.sku == code || p.id == code)
            .cloned()
    }
}

/// Stub order committer: assigns a UUID and echoes the draft back.
struct EchoCommitter;

#[async_trait]
impl OrderCommitter for EchoCommitter {
    async fn commit(&self, draft: OrderDraft) -> Result<Order, CommitError> {
        Ok(Order::committed(Uuid::new_v4().to_string(), draft))
    }
}

fn demo_catalog() -> MemoryCatalog {
    MemoryCatalog(vec![
        Product {
            id: "c0a1".to_string(),
            sku: "BEV-001".to_string(),
            name: "Cola 330ml".to_string(),
            price_cents: 199,
            cost_price_cents: Some(120),
            stock: 24,
            image_url: None,
        },
        Product {
            id: "c0a2".to_string(),
            sku: "SNK-014".to_string(),
            name: "Chips Classic".to_string(),
            price_cents: 249,
            cost_price_cents: None,
            stock: 8,
            image_url: None,
        },
    ])
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = demo_catalog();
    let state = RegisterState::new(Register::new(TaxRate::from_fraction(0.08)));
    let operator = Staff {
        id: "staff-1".to_string(),
        name: "Alex".to_string(),
    };

    // Slot 0: a regular sale
    state.with_register_mut(|r| -> Result<(), Box<dyn std::error::Error>> {
        r.add_scanned(&catalog, "BEV-001")?;
        r.add_scanned(&catalog, "BEV-001")?; // merges into one line, qty 2
        r.add_scanned(&catalog, "SNK-014")?;
        r.set_discount(DiscountKind::Fixed, 1.0)?;
        Ok(())
    })?;

    // Slot 1: park a return while the first customer digs for their card
    state.with_register_mut(|r| -> Result<(), Box<dyn std::error::Error>> {
        r.set_active_slot(1)?;
        r.toggle_return_mode()?;
        r.add_scanned(&catalog, "SNK-014")?;
        r.set_customer_name("Jamie")?;
        r.set_active_slot(0)?;
        Ok(())
    })?;

    let totals = state.with_register(|r| r.totals());
    println!(
        "slot 0 before checkout: {} lines, subtotal {}, total {}",
        totals.line_count, totals.subtotal, totals.total_amount
    );

    let order = checkout(&state, &EchoCommitter, &operator).await?;
    println!("committed order:\n{}", serde_json::to_string_pretty(&order)?);

    state.with_register(|r| {
        for summary in r.slot_summaries() {
            println!(
                "slot {}: qty {}, customer '{}'{}",
                summary.index,
                summary.total_quantity,
                summary.customer_name,
                if summary.active { " (active)" } else { "" }
            );
        }
    });

    Ok(())
}
