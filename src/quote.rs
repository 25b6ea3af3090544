//! Checkout Quotes
//!
//! Combines coupon evaluation and delivery pricing into a single order
//! quote, with a console rendering used by the demo tooling.

use std::io;

use chrono::NaiveDateTime;
use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Color, Style, Theme, object::{Columns, Rows}},
};
use thiserror::Error;

use crate::{
    checkout::{CouponEvaluation, evaluate_coupon, evaluate_delivery_fee},
    context::OrderContext,
    coupons::Coupon,
    delivery::{DeliveryMethod, fees::DeliveryFeeError},
    money::{MoneyMathError, PriceView},
};

/// Errors while building or writing a quote.
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Wrapped money arithmetic error.
    #[error(transparent)]
    Money(#[from] MoneyMathError),

    /// Wrapped delivery pricing error.
    #[error(transparent)]
    DeliveryFee(#[from] DeliveryFeeError),

    /// IO error while writing the quote.
    #[error("IO error")]
    Io,
}

/// A priced order: subtotal, coupon savings, delivery and total.
#[derive(Debug, Clone)]
pub struct CheckoutQuote<'a> {
    subtotal: Money<'a, Currency>,
    coupon_name: Option<String>,
    coupon: Option<CouponEvaluation<'a>>,
    delivery_fee: Money<'a, Currency>,
    total: Money<'a, Currency>,
}

impl<'a> CheckoutQuote<'a> {
    /// Price an order, evaluating an optional coupon and delivery method.
    ///
    /// A qualifying coupon's discount reduces the total; free delivery
    /// from a coupon overrides the delivery fee entirely. The total never
    /// drops below zero.
    ///
    /// # Errors
    ///
    /// Returns a [`QuoteError`] when discount or fee computation fails on
    /// misconfigured amounts.
    pub fn build(
        ctx: &OrderContext<'a>,
        coupon: Option<&Coupon<'a>>,
        method: Option<&DeliveryMethod<'a>>,
        now: NaiveDateTime,
    ) -> Result<Self, QuoteError> {
        let currency = ctx.subtotal().currency();

        let evaluation = coupon
            .map(|coupon| evaluate_coupon(coupon, ctx, now))
            .transpose()?;

        let free_delivery = evaluation
            .as_ref()
            .is_some_and(|evaluation| evaluation.free_delivery);

        let delivery_fee = match method {
            Some(method) if !free_delivery => evaluate_delivery_fee(method, ctx)?,
            _ => Money::from_minor(0, currency),
        };

        let discount_minor = evaluation
            .as_ref()
            .map_or(0, |evaluation| evaluation.discount.to_minor_units());

        let total_minor = ctx.subtotal().to_minor_units() - discount_minor
            + delivery_fee.to_minor_units();

        Ok(Self {
            subtotal: *ctx.subtotal(),
            coupon_name: coupon.map(|coupon| coupon.name().to_string()),
            coupon: evaluation,
            delivery_fee,
            total: Money::from_minor(total_minor.max(0), currency),
        })
    }

    /// The order subtotal before savings and delivery.
    #[must_use]
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// The coupon evaluation, when a coupon was supplied.
    #[must_use]
    pub fn coupon(&self) -> Option<&CouponEvaluation<'a>> {
        self.coupon.as_ref()
    }

    /// The delivery charge after any free-delivery override.
    #[must_use]
    pub fn delivery_fee(&self) -> &Money<'a, Currency> {
        &self.delivery_fee
    }

    /// The amount the customer pays.
    #[must_use]
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Write the quote as a console table.
    ///
    /// # Errors
    ///
    /// Returns [`QuoteError::Io`] when the writer fails.
    pub fn write_to(&self, mut out: impl io::Write) -> Result<(), QuoteError> {
        let mut builder = Builder::default();

        builder.push_record(["Line", "Amount"]);
        builder.push_record(["Subtotal", PriceView::from_money(&self.subtotal).formatted()]);

        if let Some(evaluation) = &self.coupon {
            let label = match &self.coupon_name {
                Some(name) if evaluation.qualifies => format!("Coupon \u{201c}{name}\u{201d}"),
                Some(name) => format!("Coupon \u{201c}{name}\u{201d} (not applied)"),
                None => "Coupon".to_string(),
            };

            let amount = if evaluation.discount.to_minor_units() > 0 {
                format!("-{}", PriceView::from_money(&evaluation.discount).formatted())
            } else {
                PriceView::from_money(&evaluation.discount)
                    .formatted()
                    .to_string()
            };

            builder.push_record([label, amount]);

            if evaluation.free_delivery {
                builder.push_record(["Free delivery".to_string(), "\u{2713}".to_string()]);
            }
        }

        builder.push_record([
            "Delivery".to_string(),
            PriceView::from_money(&self.delivery_fee).formatted().to_string(),
        ]);
        builder.push_record([
            "Total".to_string(),
            PriceView::from_money(&self.total).formatted().to_string(),
        ]);

        let mut table = builder.build();
        let theme = Theme::from(Style::modern_rounded());

        table.with(theme);
        table.modify(Rows::first(), Color::BOLD);
        table.modify(Rows::last(), Color::BOLD);
        table.modify(Columns::new(1..2), Alignment::right());

        writeln!(out, "{table}").map_err(|_err| QuoteError::Io)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use decimal_percentage::Percentage;
    use rusty_money::iso::USD;
    use testresult::TestResult;

    use crate::{
        coupons::{CouponBenefits, DiscountKind},
        delivery::FeePolicy,
    };

    use super::*;

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 3)
            .and_then(|date| date.and_hms_opt(12, 0, 0))
            .unwrap_or_default()
    }

    fn flat_method<'a>() -> Result<DeliveryMethod<'a>, crate::delivery::DeliveryConfigError> {
        DeliveryMethod::new(
            "Standard",
            true,
            true,
            FeePolicy::Flat(Money::from_minor(2_500, USD)),
        )
    }

    #[test]
    fn quote_combines_discount_and_fee() -> TestResult {
        let coupon = Coupon::new(
            "Summer",
            true,
            CouponBenefits::discount_only(DiscountKind::Percentage(Percentage::from(0.2))),
            Vec::new(),
        );
        let method = flat_method()?;
        let ctx = OrderContext::new(Money::from_minor(10_000, USD));

        let quote = CheckoutQuote::build(&ctx, Some(&coupon), Some(&method), noon())?;

        assert_eq!(quote.subtotal(), &Money::from_minor(10_000, USD));
        assert_eq!(quote.delivery_fee(), &Money::from_minor(2_500, USD));
        assert_eq!(quote.total(), &Money::from_minor(10_500, USD));

        Ok(())
    }

    #[test]
    fn free_delivery_coupon_zeroes_the_fee() -> TestResult {
        let coupon = Coupon::new(
            "Ship Free",
            true,
            CouponBenefits::free_delivery_only(),
            Vec::new(),
        );
        let method = flat_method()?;
        let ctx = OrderContext::new(Money::from_minor(10_000, USD));

        let quote = CheckoutQuote::build(&ctx, Some(&coupon), Some(&method), noon())?;

        assert_eq!(quote.delivery_fee(), &Money::from_minor(0, USD));
        assert_eq!(quote.total(), &Money::from_minor(10_000, USD));

        Ok(())
    }

    #[test]
    fn quote_without_coupon_or_method_is_the_subtotal() -> TestResult {
        let ctx = OrderContext::new(Money::from_minor(4_200, USD));

        let quote = CheckoutQuote::build(&ctx, None, None, noon())?;

        assert!(quote.coupon().is_none());
        assert_eq!(quote.total(), &Money::from_minor(4_200, USD));

        Ok(())
    }

    #[test]
    fn written_quote_contains_all_lines() -> TestResult {
        let coupon = Coupon::new(
            "Summer",
            true,
            CouponBenefits::new(Some(DiscountKind::Fixed(Money::from_minor(1_000, USD))), true)?,
            Vec::new(),
        );
        let method = flat_method()?;
        let ctx = OrderContext::new(Money::from_minor(10_000, USD));

        let quote = CheckoutQuote::build(&ctx, Some(&coupon), Some(&method), noon())?;

        let mut rendered = Vec::new();
        quote.write_to(&mut rendered)?;
        let rendered = String::from_utf8(rendered)?;

        assert!(rendered.contains("Subtotal"));
        assert!(rendered.contains("Summer"));
        assert!(rendered.contains("Total"));

        Ok(())
    }
}
