//! Checkout Demo
//!
//! Prices an order against a fixture set: evaluates a coupon, computes the
//! delivery fee, prints the quote and lists the available delivery slots.
//!
//! Run with: `cargo run --example checkout -- --coupon summer20 --code SUMMER20`

use std::io;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use clap::Parser;
use rustc_hash::FxHashMap;
use rusty_money::Money;

use tally::{
    checkout::list_available_slots,
    context::{Destination, OrderContext},
    fixtures::{Fixture, parse_money},
    quote::CheckoutQuote,
};

/// Arguments for the checkout demo
#[derive(Debug, Parser)]
struct CheckoutArgs {
    /// Fixture set to use for coupons & delivery methods
    #[clap(short, long, default_value = "storefront")]
    fixture: String,

    /// Coupon key within the fixture set
    #[clap(long)]
    coupon: Option<String>,

    /// Redemption code supplied by the customer
    #[clap(long)]
    code: Option<String>,

    /// Delivery method key within the fixture set
    #[clap(long, default_value = "standard")]
    delivery: String,

    /// Order subtotal (e.g. "100.00 USD")
    #[clap(long, default_value = "100.00 USD")]
    subtotal: String,

    /// Destination distance in kilometres
    #[clap(long)]
    distance: Option<f64>,

    /// Destination postal code
    #[clap(long)]
    postal_code: Option<String>,

    /// Requested delivery date (e.g. "2026-08-10"); defaults to today
    #[clap(long)]
    date: Option<NaiveDate>,
}

#[expect(clippy::print_stdout, reason = "Demo code")]
fn main() -> Result<()> {
    let args = CheckoutArgs::parse();
    let now = Local::now().naive_local();

    let fixture = Fixture::from_set(&args.fixture)?;

    let (subtotal_minor, currency) = parse_money(&args.subtotal)?;
    let mut ctx = OrderContext::new(Money::from_minor(subtotal_minor, currency));

    if let Some(code) = &args.code {
        ctx = ctx.with_supplied_code(code.clone());
    }

    if let Some(distance) = args.distance {
        let km = rust_decimal::Decimal::try_from(distance)
            .map_err(|err| anyhow!("invalid distance: {err}"))?;

        ctx = ctx.with_destination(Destination::Distance(km));
    } else if let Some(postal_code) = &args.postal_code {
        ctx = ctx.with_destination(Destination::PostalCode(postal_code.clone()));
    }

    let coupon = args
        .coupon
        .as_deref()
        .map(|key| fixture.coupon(key))
        .transpose()?;

    let method = fixture.delivery_method(&args.delivery)?;

    let quote = CheckoutQuote::build(&ctx, coupon, Some(method), now)?;
    quote.write_to(io::stdout())?;

    let date = args.date.unwrap_or_else(|| now.date());
    let slots = list_available_slots(method, date, now, &FxHashMap::default())?;

    if slots.is_empty() {
        println!("No delivery slots on {date} for \u{201c}{}\u{201d}.", method.name());
    } else {
        println!("Delivery slots on {date}:");

        for slot in slots {
            println!("  {slot}");
        }
    }

    Ok(())
}
