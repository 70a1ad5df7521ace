//! Billing estimate for a booking request.

use crate::core::error::BookingError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BillingEstimate {
    /// Fractional hours, e.g. 1.5 for a 90 minute slot.
    pub hours: f64,
    pub amount: f64,
}

/// Computes the duration and estimated amount for a time span at the given
/// hourly rate. The rate is a point-in-time snapshot taken by the caller;
/// the amount is never recomputed after booking creation.
pub fn estimate(
    start: NaiveDateTime,
    end: NaiveDateTime,
    hourly_rate: f64,
) -> Result<BillingEstimate, BookingError> {
    if end <= start {
        return Err(BookingError::InvalidDuration);
    }

    let hours = (end - start).num_seconds() as f64 / 3600.0;

    Ok(BillingEstimate {
        hours,
        amount: hours * hourly_rate,
    })
}
