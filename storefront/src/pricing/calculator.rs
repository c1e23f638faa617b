//! Price Calculator
//!
//! Uses rust_decimal for the arithmetic, stores as f64.

use rust_decimal::prelude::*;

/// Order totals keep cents
const MONEY_DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
pub(crate) fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(MONEY_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Leading decimal number of a text, ignoring whatever follows it.
///
/// `"40% off"` → 40, `" 12.5"` → 12.5, `".5x"` → 0.5, `"off"` → None.
pub fn leading_number(text: &str) -> Option<Decimal> {
    let s = text.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let int_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    let int_part = &rest[..int_len];
    let frac_part = match rest[int_len..].strip_prefix('.') {
        Some(after_dot) => {
            let frac_len = after_dot.bytes().take_while(u8::is_ascii_digit).count();
            &after_dot[..frac_len]
        }
        None => "",
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut literal = String::with_capacity(int_len + frac_part.len() + 3);
    if negative {
        literal.push('-');
    }
    literal.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        literal.push('.');
        literal.push_str(frac_part);
    }
    Decimal::from_str(&literal).ok()
}

/// Discount percentage encoded in an offer label
pub fn discount_percent(offer: &str) -> Option<Decimal> {
    leading_number(offer)
}

/// Current price from the original price and a discount percentage.
///
/// - no original price, or ≤ 0 → `None`
/// - no discount, or outside `0..=100` → original price rounded
/// - otherwise `P × (1 − D/100)` rounded
///
/// Rounding is to whole currency units, midpoint away from zero.
pub fn derive_price(old_price: Option<Decimal>, discount: Option<Decimal>) -> Option<Decimal> {
    let original = old_price.filter(|p| p.is_sign_positive() && !p.is_zero())?;

    let discounted = match discount {
        Some(d) if d >= Decimal::ZERO && d <= Decimal::ONE_HUNDRED => {
            original * (Decimal::ONE - d / Decimal::ONE_HUNDRED)
        }
        _ => original,
    };

    Some(discounted.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
}

/// [`derive_price`] over the stored representation (f64 price, text offer)
pub fn price_from_offer(old_price: Option<f64>, offer: Option<&str>) -> Option<f64> {
    let old = old_price.filter(|p| p.is_finite()).map(to_decimal);
    derive_price(old, offer.and_then(discount_percent)).and_then(|p| p.to_f64())
}

/// Raw admin form fields that drive the computed price
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceInput {
    pub old_price: String,
    pub offer: String,
}

impl PriceInput {
    pub fn new(old_price: impl Into<String>, offer: impl Into<String>) -> Self {
        Self {
            old_price: old_price.into(),
            offer: offer.into(),
        }
    }

    /// Parsed original price; unparsable text counts as absent
    pub fn old_price(&self) -> Option<Decimal> {
        leading_number(&self.old_price)
    }

    pub fn discount(&self) -> Option<Decimal> {
        discount_percent(&self.offer)
    }

    /// Price the form should display, `None` clears the field
    pub fn derived_price(&self) -> Option<Decimal> {
        derive_price(self.old_price(), self.discount())
    }
}

/// Unit price × quantity
pub fn line_total(unit_price: f64, quantity: u32) -> Decimal {
    to_decimal(unit_price) * Decimal::from(quantity)
}

/// Sum of line totals, rounded to cents
pub fn order_total<I>(lines: I) -> f64
where
    I: IntoIterator<Item = (f64, u32)>,
{
    let total: Decimal = lines
        .into_iter()
        .map(|(price, qty)| line_total(price, qty))
        .sum();
    to_f64(total)
}
