//! Order Context
//!
//! The ephemeral snapshot of a proposed order that coupon and delivery
//! evaluation run against. Nothing here is persisted; checkout handlers
//! assemble a context per request.

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};

/// Where an order is being delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Distance from the store in kilometres.
    Distance(Decimal),

    /// Destination postal code.
    PostalCode(String),
}

/// Snapshot of a proposed order used as evaluation input.
///
/// Optional fields the caller could not determine stay unset; any rule that
/// needs them fails closed rather than erroring.
#[derive(Debug, Clone)]
pub struct OrderContext<'a> {
    subtotal: Money<'a, Currency>,
    unique_products: u32,
    total_quantity: u32,
    new_customer: Option<bool>,
    supplied_code: Option<String>,
    destination: Option<Destination>,
}

impl<'a> OrderContext<'a> {
    /// Create a context carrying just an order subtotal.
    #[must_use]
    pub fn new(subtotal: Money<'a, Currency>) -> Self {
        Self {
            subtotal,
            unique_products: 0,
            total_quantity: 0,
            new_customer: None,
            supplied_code: None,
            destination: None,
        }
    }

    /// Set the distinct product count and total item quantity.
    #[must_use]
    pub fn with_counts(mut self, unique_products: u32, total_quantity: u32) -> Self {
        self.unique_products = unique_products;
        self.total_quantity = total_quantity;
        self
    }

    /// Set whether the customer is ordering for the first time.
    #[must_use]
    pub fn with_new_customer(mut self, new_customer: bool) -> Self {
        self.new_customer = Some(new_customer);
        self
    }

    /// Set the coupon code the customer supplied.
    #[must_use]
    pub fn with_supplied_code(mut self, code: impl Into<String>) -> Self {
        self.supplied_code = Some(code.into());
        self
    }

    /// Set the delivery destination.
    #[must_use]
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = Some(destination);
        self
    }

    /// The order subtotal.
    #[must_use]
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// Number of distinct products in the order.
    #[must_use]
    pub fn unique_products(&self) -> u32 {
        self.unique_products
    }

    /// Total item quantity across the order.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.total_quantity
    }

    /// Whether the customer is new, when known.
    #[must_use]
    pub fn new_customer(&self) -> Option<bool> {
        self.new_customer
    }

    /// The coupon code the customer supplied, if any.
    #[must_use]
    pub fn supplied_code(&self) -> Option<&str> {
        self.supplied_code.as_deref()
    }

    /// The delivery destination, if known.
    #[must_use]
    pub fn destination(&self) -> Option<&Destination> {
        self.destination.as_ref()
    }
}
