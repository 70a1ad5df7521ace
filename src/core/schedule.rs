//! Slot expansion: turns a recurring availability description into concrete,
//! dated slot drafts.
//!
//! Expansion is a pure function of its inputs. The same request always yields
//! the same drafts in the same ascending date order, so a preview count shown
//! before submission matches what gets persisted.
//!
//! Times are naive wall-clock values under a single-region convention; there
//! is no timezone arithmetic here.

use crate::core::error::ScheduleError;
use crate::infrastructure::entities::SlotSidecar;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use serde::{Deserialize, Serialize};

/// Day-of-week selection for recurring availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl RepeatDay {
    pub fn weekday(self) -> Weekday {
        match self {
            RepeatDay::Mon => Weekday::Mon,
            RepeatDay::Tue => Weekday::Tue,
            RepeatDay::Wed => Weekday::Wed,
            RepeatDay::Thu => Weekday::Thu,
            RepeatDay::Fri => Weekday::Fri,
            RepeatDay::Sat => Weekday::Sat,
            RepeatDay::Sun => Weekday::Sun,
        }
    }
}

/// A "post availability" submission before expansion.
#[derive(Debug, Clone)]
pub struct AvailabilityRequest {
    pub date_from: NaiveDate,
    /// Absent means the range is the single day `date_from`.
    pub date_to: Option<NaiveDate>,
    /// Empty means a single occurrence anchored at `date_from`.
    pub repeat_days: Vec<RepeatDay>,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub sidecar: SlotSidecar,
}

/// An in-memory, not-yet-persisted slot produced by expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotDraft {
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
}

/// Expands a recurring availability description into dated slot drafts,
/// ascending by date. Performs all boundary validation; a `Err` means
/// nothing should be written.
pub fn expand(request: &AvailabilityRequest) -> Result<Vec<SlotDraft>, ScheduleError> {
    if request.end_time <= request.start_time {
        return Err(ScheduleError::EmptyTimeWindow);
    }
    if request.sidecar.hourly_rate <= 0.0 {
        return Err(ScheduleError::InvalidRate);
    }

    let date_to = request.date_to.unwrap_or(request.date_from);
    if date_to < request.date_from {
        return Err(ScheduleError::InvertedDateRange);
    }

    let draft = |date: NaiveDate| SlotDraft {
        start_time: date.and_time(request.start_time),
        end_time: date.and_time(request.end_time),
    };

    if request.repeat_days.is_empty() {
        // Single occurrence: anchored at date_from regardless of weekday.
        return Ok(vec![draft(request.date_from)]);
    }

    let drafts: Vec<SlotDraft> = request
        .date_from
        .iter_days()
        .take_while(|date| *date <= date_to)
        .filter(|date| {
            request
                .repeat_days
                .iter()
                .any(|day| day.weekday() == date.weekday())
        })
        .map(draft)
        .collect();

    if drafts.is_empty() {
        return Err(ScheduleError::NoSlotsGenerated);
    }

    Ok(drafts)
}
