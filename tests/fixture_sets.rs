//! Integration tests for the storefront fixture set.
//!
//! Loads the YAML fixture set shipped with the repository and runs full
//! checkout evaluations against it, plus a custom-base-path round trip
//! through a temporary directory.

use std::fs;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::USD};
use testresult::TestResult;

use tally::{
    checkout::{evaluate_coupon, evaluate_delivery_fee, list_available_slots},
    context::{Destination, OrderContext},
    fixtures::Fixture,
    quote::CheckoutQuote,
};

// 2026-07-06 is a Monday inside the summer coupon's validity window.
fn summer_monday_lunch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 7, 6)
        .and_then(|date| date.and_hms_opt(12, 30, 0))
        .unwrap_or_default()
}

#[test]
fn summer_coupon_requires_its_code() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let coupon = fixture.coupon("summer20")?;

    let with_code = OrderContext::new(Money::from_minor(10_000, USD))
        .with_supplied_code("summer20");
    let without_code = OrderContext::new(Money::from_minor(10_000, USD));

    let accepted = evaluate_coupon(coupon, &with_code, summer_monday_lunch())?;
    let rejected = evaluate_coupon(coupon, &without_code, summer_monday_lunch())?;

    assert!(accepted.qualifies);
    assert_eq!(accepted.discount, Money::from_minor(2_000, USD));
    assert!(!rejected.qualifies);

    Ok(())
}

#[test]
fn lunch_coupon_is_bounded_by_hours_and_subtotal() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let coupon = fixture.coupon("weekday-lunch")?;

    let lunch_order = OrderContext::new(Money::from_minor(2_500, USD));
    let small_order = OrderContext::new(Money::from_minor(1_500, USD));

    let evening = NaiveDate::from_ymd_opt(2026, 7, 6)
        .and_then(|date| date.and_hms_opt(19, 0, 0))
        .unwrap_or_default();

    assert!(
        evaluate_coupon(coupon, &lunch_order, summer_monday_lunch())?.qualifies,
        "lunch-hours order above the minimum must qualify"
    );
    assert!(
        !evaluate_coupon(coupon, &lunch_order, evening)?.qualifies,
        "evening order must not qualify"
    );
    assert!(
        !evaluate_coupon(coupon, &small_order, summer_monday_lunch())?.qualifies,
        "order below the minimum must not qualify"
    );

    Ok(())
}

#[test]
fn first_order_coupon_is_gated_on_customer_status() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let coupon = fixture.coupon("first-order")?;

    let new_customer = OrderContext::new(Money::from_minor(6_000, USD)).with_new_customer(true);
    let returning = OrderContext::new(Money::from_minor(6_000, USD)).with_new_customer(false);
    let unknown = OrderContext::new(Money::from_minor(6_000, USD));

    let accepted = evaluate_coupon(coupon, &new_customer, summer_monday_lunch())?;

    assert!(accepted.qualifies);
    assert!(accepted.free_delivery);
    assert_eq!(accepted.discount, Money::from_minor(900, USD));

    assert!(!evaluate_coupon(coupon, &returning, summer_monday_lunch())?.qualifies);
    assert!(!evaluate_coupon(coupon, &unknown, summer_monday_lunch())?.qualifies);

    Ok(())
}

#[test]
fn neighborhood_method_prices_postal_codes_with_percentage_fallback() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let method = fixture.delivery_method("neighborhood")?;

    let known = OrderContext::new(Money::from_minor(10_000, USD))
        .with_destination(Destination::PostalCode("90210".to_string()));
    let unknown = OrderContext::new(Money::from_minor(10_000, USD))
        .with_destination(Destination::PostalCode("10001".to_string()));

    assert_eq!(
        evaluate_delivery_fee(method, &known)?,
        Money::from_minor(300, USD)
    );
    assert_eq!(
        evaluate_delivery_fee(method, &unknown)?,
        Money::from_minor(500, USD),
        "unmatched postal code must fall back to 5% of the subtotal"
    );

    Ok(())
}

#[test]
fn standard_method_waives_fee_for_large_orders() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let method = fixture.delivery_method("standard")?;

    let small = OrderContext::new(Money::from_minor(2_000, USD));
    let large = OrderContext::new(Money::from_minor(8_000, USD));

    assert_eq!(
        evaluate_delivery_fee(method, &small)?,
        Money::from_minor(500, USD)
    );
    assert_eq!(
        evaluate_delivery_fee(method, &large)?,
        Money::from_minor(0, USD)
    );
    assert!(!method.qualifies(&Money::from_minor(900, USD)));

    Ok(())
}

#[test]
fn courier_slots_respect_notice_and_weekday_windows() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let method = fixture.delivery_method("courier")?;

    // 2026-08-14 is a Friday with split hours 09:00-13:00 and 14:00-18:00.
    let friday = NaiveDate::from_ymd_opt(2026, 8, 14).unwrap_or_default();
    let friday_morning = friday
        .and_hms_opt(8, 0, 0)
        .unwrap_or_default();

    let slots = list_available_slots(method, friday, friday_morning, &FxHashMap::default())?;
    let rendered: Vec<String> = slots.iter().map(ToString::to_string).collect();

    // The 2-hour minimum notice drops the 09:00 slot; the split windows
    // partition into 2-hour slots with the odd remainders dropped.
    assert_eq!(rendered, vec!["11:00 - 13:00", "14:00 - 16:00", "16:00 - 18:00"]);

    Ok(())
}

#[test]
fn full_quote_combines_fixture_coupon_and_method() -> TestResult {
    let fixture = Fixture::from_set("storefront")?;
    let coupon = fixture.coupon("summer20")?;
    let method = fixture.delivery_method("courier")?;

    let ctx = OrderContext::new(Money::from_minor(10_000, USD))
        .with_supplied_code("SUMMER20")
        .with_destination(Destination::Distance(Decimal::from(12)));

    let quote = CheckoutQuote::build(&ctx, Some(coupon), Some(method), summer_monday_lunch())?;

    // 100.00 - 20.00 discount + 40.00 mid-zone courier fee.
    assert_eq!(quote.total(), &Money::from_minor(12_000, USD));

    Ok(())
}

#[test]
fn fixture_sets_load_from_a_custom_base_path() -> TestResult {
    let dir = tempfile::tempdir()?;

    fs::create_dir_all(dir.path().join("coupons"))?;
    fs::write(
        dir.path().join("coupons").join("mini.yml"),
        r#"
coupons:
  flash:
    name: Flash Sale
    discount:
      type: percentage
      value: 0.3
"#,
    )?;

    let mut fixture = Fixture::with_base_path(dir.path());
    fixture.load_coupons("mini")?;

    let coupon = fixture.coupon("flash")?;
    let ctx = OrderContext::new(Money::from_minor(1_000, USD));

    let evaluation = evaluate_coupon(coupon, &ctx, summer_monday_lunch())?;

    assert!(evaluation.qualifies);
    assert_eq!(evaluation.discount, Money::from_minor(300, USD));

    Ok(())
}

#[test]
fn malformed_fixture_money_fails_at_load_time() -> TestResult {
    let dir = tempfile::tempdir()?;

    fs::create_dir_all(dir.path().join("coupons"))?;
    fs::write(
        dir.path().join("coupons").join("broken.yml"),
        r#"
coupons:
  broken:
    name: Broken
    discount:
      type: fixed
      value: "five dollars"
"#,
    )?;

    let mut fixture = Fixture::with_base_path(dir.path());
    let result = fixture.load_coupons("broken");

    assert!(result.is_err(), "malformed money must fail at load time");

    Ok(())
}
