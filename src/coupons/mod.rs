//! Coupons
//!
//! Store-scoped discount offers. A coupon carries its benefits (a discount,
//! free delivery, or both) and a set of activation rules that gate when it
//! qualifies.

use chrono::NaiveDateTime;
use decimal_percentage::Percentage;
use rusty_money::{Money, iso::Currency};
use slotmap::new_key_type;
use thiserror::Error;

use crate::{context::OrderContext, coupons::activation::ActivationRule};

pub mod activation;
pub mod discount;

new_key_type! {
    /// Coupon Key
    pub struct CouponKey;
}

/// Errors from coupon construction or redemption.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CouponError {
    /// Neither a discount nor free delivery was offered.
    #[error("coupon must offer a discount, free delivery, or both")]
    NoBenefit,

    /// The usage counter is exhausted.
    #[error("coupon has no redemptions remaining")]
    Exhausted,
}

/// The kind of discount a coupon offers on the order subtotal.
#[derive(Debug, Copy, Clone)]
pub enum DiscountKind<'a> {
    /// Percentage off the subtotal (e.g. 20%).
    Percentage(Percentage),

    /// Fixed amount off the subtotal.
    Fixed(Money<'a, Currency>),
}

/// What a qualifying coupon grants.
#[derive(Debug, Copy, Clone)]
pub struct CouponBenefits<'a> {
    discount: Option<DiscountKind<'a>>,
    free_delivery: bool,
}

impl<'a> CouponBenefits<'a> {
    /// Create a benefit set.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::NoBenefit`] when neither a discount nor free
    /// delivery is offered: a coupon must grant at least one.
    pub fn new(
        discount: Option<DiscountKind<'a>>,
        free_delivery: bool,
    ) -> Result<Self, CouponError> {
        if discount.is_none() && !free_delivery {
            return Err(CouponError::NoBenefit);
        }

        Ok(Self {
            discount,
            free_delivery,
        })
    }

    /// A benefit set granting only a discount.
    #[must_use]
    pub fn discount_only(discount: DiscountKind<'a>) -> Self {
        Self {
            discount: Some(discount),
            free_delivery: false,
        }
    }

    /// A benefit set granting only free delivery.
    #[must_use]
    pub fn free_delivery_only() -> Self {
        Self {
            discount: None,
            free_delivery: true,
        }
    }

    /// The discount offered, if any.
    #[must_use]
    pub fn discount(&self) -> Option<DiscountKind<'a>> {
        self.discount
    }

    /// Whether free delivery is granted.
    #[must_use]
    pub fn grants_free_delivery(&self) -> bool {
        self.free_delivery
    }
}

/// A coupon with its activation rule set.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    name: String,
    active: bool,
    benefits: CouponBenefits<'a>,
    rules: Vec<ActivationRule<'a>>,
    remaining_quantity: Option<u32>,
}

impl<'a> Coupon<'a> {
    /// Create a coupon.
    pub fn new(
        name: impl Into<String>,
        active: bool,
        benefits: CouponBenefits<'a>,
        rules: Vec<ActivationRule<'a>>,
    ) -> Self {
        Self {
            name: name.into(),
            active,
            benefits,
            rules,
            remaining_quantity: None,
        }
    }

    /// Set the number of redemptions remaining.
    #[must_use]
    pub fn with_remaining_quantity(mut self, remaining: u32) -> Self {
        self.remaining_quantity = Some(remaining);
        self
    }

    /// Coupon display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the coupon is live at all.
    #[must_use]
    pub fn active(&self) -> bool {
        self.active
    }

    /// The benefits a qualifying order receives.
    #[must_use]
    pub fn benefits(&self) -> &CouponBenefits<'a> {
        &self.benefits
    }

    /// The configured activation rules.
    #[must_use]
    pub fn rules(&self) -> &[ActivationRule<'a>] {
        &self.rules
    }

    /// Redemptions remaining, when a usage counter is configured.
    #[must_use]
    pub fn remaining_quantity(&self) -> Option<u32> {
        self.remaining_quantity
    }

    /// Whether the coupon currently qualifies for the given order.
    ///
    /// Every configured rule must pass; a coupon with no rules qualifies
    /// whenever its `active` flag is set. Rules never error: data they need
    /// that the context does not carry fails the rule closed.
    #[must_use]
    pub fn is_active(&self, ctx: &OrderContext<'_>, now: NaiveDateTime) -> bool {
        self.active
            && self
                .rules
                .iter()
                .all(|rule| rule.is_satisfied(ctx, now, self.remaining_quantity))
    }

    /// Record a redemption, decrementing the usage counter when one is
    /// configured.
    ///
    /// The counter never drops below zero: at zero this returns
    /// [`CouponError::Exhausted`] and leaves the counter untouched. Callers
    /// that persist coupons must run this compare-and-decrement under a
    /// per-coupon guard so two concurrent checkouts cannot both observe a
    /// positive counter.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::Exhausted`] when the counter is already zero.
    pub fn record_redemption(&mut self) -> Result<(), CouponError> {
        match self.remaining_quantity.as_mut() {
            None => Ok(()),
            Some(0) => Err(CouponError::Exhausted),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
        }
    }
}
