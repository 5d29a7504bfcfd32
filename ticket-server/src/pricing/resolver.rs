//! Price Resolver
//!
//! Given a ticket category and an instant, picks the applicable price from
//! the category's timebound windows. The non-overlap invariant makes the
//! match unambiguous; outside every window the category's base price
//! applies.

use thiserror::Error;

use crate::catalog::{TicketCategory, TimeboundPrice};

/// Price window validation errors
#[derive(Debug, Error)]
pub enum PricingError {
    #[error("Price window {0} ends before it starts")]
    InvertedWindow(String),

    #[error("Price windows {0} and {1} overlap for category {2}")]
    OverlappingWindows(String, String, String),

    #[error("Price window {0} does not belong to category {1}")]
    WrongCategory(String, String),
}

/// Resolve the price for `category` at instant `at` (UTC milliseconds).
///
/// Deterministic and pure: exactly one window can contain `at` by the
/// non-overlap invariant; no match falls back to the base price.
pub fn resolve(category: &TicketCategory, windows: &[TimeboundPrice], at: i64) -> f64 {
    windows
        .iter()
        .find(|w| w.contains(at))
        .map(|w| w.price)
        .unwrap_or(category.base_price)
}

/// Validate a category's window set before it is persisted.
///
/// Rejects inverted windows, windows assigned to another category, and any
/// overlapping pair. Bounds are inclusive, so a window ending at `t` and
/// another starting at `t` do overlap.
pub fn validate_windows(
    category_id: &str,
    windows: &[TimeboundPrice],
) -> Result<(), PricingError> {
    for w in windows {
        if w.category_id != category_id {
            return Err(PricingError::WrongCategory(
                w.price_id.clone(),
                category_id.to_string(),
            ));
        }
        if w.ends_at < w.starts_at {
            return Err(PricingError::InvertedWindow(w.price_id.clone()));
        }
    }

    let mut sorted: Vec<&TimeboundPrice> = windows.iter().collect();
    sorted.sort_by_key(|w| w.starts_at);
    for pair in sorted.windows(2) {
        if pair[1].starts_at <= pair[0].ends_at {
            return Err(PricingError::OverlappingWindows(
                pair[0].price_id.clone(),
                pair[1].price_id.clone(),
                category_id.to_string(),
            ));
        }
    }
    Ok(())
}
