//! Tiered conversion fee and quote calculation.

/// Fraction of the amount withheld as conversion fee, tiered by
/// transaction size in source-currency units.
pub fn fee_fraction(amount: f64) -> f64 {
    if amount < 100_000.0 {
        0.03
    } else if amount < 500_000.0 {
        0.02
    } else {
        0.01
    }
}

/// A conversion quote derived from the current amount and latest rates.
///
/// Recomputed on every amount change, never persisted. No rounding is
/// applied here; two-decimal rounding happens at display time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Quote {
    /// Amount in the base currency, after the defensive clamp.
    pub amount: f64,
    /// Fee in base-currency units: `amount * fee_fraction(amount)`.
    pub fee: f64,
    /// The same fee denominated in USD via the base->USD factor.
    pub usd_fee: f64,
    /// `amount * base_rate - fee`.
    pub net_received: f64,
}

/// Computes a quote for `amount` at the given base->target rate and
/// base->USD factor.
///
/// Negative or non-finite amounts are clamped to zero rather than
/// rejected.
pub fn compute_quote(amount: f64, base_rate: f64, usd_rate: f64) -> Quote {
    let amount = if amount.is_finite() && amount > 0.0 {
        amount
    } else {
        0.0
    };
    let fraction = fee_fraction(amount);
    let fee = amount * fraction;
    Quote {
        amount,
        fee,
        usd_fee: amount * usd_rate * fraction,
        net_received: amount * base_rate - fee,
    }
}

/// Parses a user-entered amount, tolerating thousands separators.
/// Anything that does not parse collapses to zero.
pub fn parse_amount(input: &str) -> f64 {
    input
        .trim()
        .replace(',', "")
        .parse::<f64>()
        .unwrap_or(0.0)
        .max(0.0)
}
