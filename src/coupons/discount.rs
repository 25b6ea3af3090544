//! Coupon Discounts
//!
//! Computes what a qualifying coupon takes off an order subtotal.

use rusty_money::{Money, iso::Currency};

use crate::{
    coupons::{Coupon, DiscountKind},
    money::{MoneyMathError, ensure_same_currency, percent_of_minor},
};

/// The benefit granted by a qualifying coupon.
#[derive(Debug, Clone, PartialEq)]
pub struct CouponSavings<'a> {
    /// Amount taken off the subtotal.
    pub discount: Money<'a, Currency>,

    /// Whether delivery is free.
    pub free_delivery: bool,
}

/// Calculate the discount a coupon grants on a subtotal.
///
/// The discount never exceeds the subtotal. Percentage discounts are
/// computed in decimal space and rounded half-up once, at the end; fixed
/// discounts are clamped to the subtotal. A coupon offering no discount
/// yields a zero discount in the subtotal's currency.
///
/// # Errors
///
/// - [`MoneyMathError::PercentConversion`] when a percentage result cannot
///   be represented in minor units.
/// - [`MoneyMathError::CurrencyMismatch`] when a fixed discount is
///   configured in a different currency than the subtotal.
pub fn compute_discount<'a>(
    coupon: &Coupon<'a>,
    subtotal: &Money<'a, Currency>,
) -> Result<CouponSavings<'a>, MoneyMathError> {
    let subtotal_minor = subtotal.to_minor_units();
    let currency = subtotal.currency();

    let discount_minor = match coupon.benefits().discount() {
        None => 0,
        Some(DiscountKind::Percentage(rate)) => {
            percent_of_minor(rate, subtotal_minor)?.min(subtotal_minor)
        }
        Some(DiscountKind::Fixed(amount)) => {
            ensure_same_currency(currency, amount.currency())?;

            amount.to_minor_units().min(subtotal_minor)
        }
    };

    Ok(CouponSavings {
        discount: Money::from_minor(discount_minor.max(0), currency),
        free_delivery: coupon.benefits().grants_free_delivery(),
    })
}

#[cfg(test)]
mod tests {
    use decimal_percentage::Percentage;
    use rusty_money::iso::{GBP, USD};
    use testresult::TestResult;

    use crate::coupons::CouponBenefits;

    use super::*;

    fn coupon<'a>(benefits: CouponBenefits<'a>) -> Coupon<'a> {
        Coupon::new("Test", true, benefits, Vec::new())
    }

    #[test]
    fn percentage_discount_on_subtotal() -> TestResult {
        let coupon = coupon(CouponBenefits::discount_only(DiscountKind::Percentage(
            Percentage::from(0.2),
        )));

        let savings = compute_discount(&coupon, &Money::from_minor(10_000, USD))?;

        assert_eq!(savings.discount, Money::from_minor(2_000, USD));
        assert!(!savings.free_delivery);

        Ok(())
    }

    #[test]
    fn fixed_discount_clamps_to_subtotal() -> TestResult {
        let coupon = coupon(CouponBenefits::discount_only(DiscountKind::Fixed(
            Money::from_minor(5_000, USD),
        )));

        let savings = compute_discount(&coupon, &Money::from_minor(3_000, USD))?;

        assert_eq!(savings.discount, Money::from_minor(3_000, USD));

        Ok(())
    }

    #[test]
    fn oversized_percentage_clamps_to_subtotal() -> TestResult {
        let coupon = coupon(CouponBenefits::discount_only(DiscountKind::Percentage(
            Percentage::from(1.5),
        )));

        let savings = compute_discount(&coupon, &Money::from_minor(2_000, USD))?;

        assert_eq!(savings.discount, Money::from_minor(2_000, USD));

        Ok(())
    }

    #[test]
    fn percentage_rounds_half_up_once() -> TestResult {
        // 15% of 10.50 = 1.575, so the discount lands on 1.58.
        let coupon = coupon(CouponBenefits::discount_only(DiscountKind::Percentage(
            Percentage::from(0.15),
        )));

        let savings = compute_discount(&coupon, &Money::from_minor(1_050, USD))?;

        assert_eq!(savings.discount, Money::from_minor(158, USD));

        Ok(())
    }

    #[test]
    fn free_delivery_only_coupon_yields_zero_discount() -> TestResult {
        let coupon = coupon(CouponBenefits::free_delivery_only());

        let savings = compute_discount(&coupon, &Money::from_minor(4_200, USD))?;

        assert_eq!(savings.discount, Money::from_minor(0, USD));
        assert!(savings.free_delivery);

        Ok(())
    }

    #[test]
    fn fixed_discount_in_wrong_currency_is_an_error() {
        let coupon = coupon(CouponBenefits::discount_only(DiscountKind::Fixed(
            Money::from_minor(500, GBP),
        )));

        let result = compute_discount(&coupon, &Money::from_minor(3_000, USD));

        assert!(matches!(
            result,
            Err(MoneyMathError::CurrencyMismatch { .. })
        ));
    }
}
