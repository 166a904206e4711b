// Conversion of award amounts into the reference currency
use crate::types::{RateTable, REFERENCE_CURRENCY};
use tracing::warn;

/// Convert `amount` (in `currency`) into USD.
///
/// `None` in means "no amount" and passes through unchanged. A currency the
/// table does not know also yields `None`; the miss is logged so an
/// unconverted amount never disappears from the totals unnoticed.
pub fn convert_to_usd(amount: Option<f64>, currency: &str, rates: &RateTable) -> Option<f64> {
    let amount = amount?;
    let code = currency.trim().to_uppercase();

    if code == REFERENCE_CURRENCY {
        return Some(amount);
    }

    match rates.get(&code) {
        Some(rate) => Some(amount / rate),
        None => {
            warn!(
                "No {} rate for currency {:?}, amount {} left unconverted",
                REFERENCE_CURRENCY, currency, amount
            );
            None
        }
    }
}
