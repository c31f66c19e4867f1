//! Pure decision logic shared by every backend: derived end-time computation,
//! allowed-time validation and the slot/status resolution rules for partial
//! create/update payloads. Backends perform the raw writes; the branching
//! lives here so it is identical for the in-memory and database paths.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};

use crate::error::BookingError;
use crate::types::{SlotId, SlotSelector};

pub const SLOT_DURATION_MINUTES: i64 = 30;

/// How a payload's slot reference resolves against the current binding.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotDirective {
    /// An explicit id was given; the id wins over any natural-key fields.
    UseExisting(SlotId),
    /// No id was given; look the natural key up, creating the slot if absent.
    ResolveNaturalKey {
        time_start: NaiveTime,
        date_start: NaiveDate,
    },
    /// Leave the current slot binding untouched.
    KeepCurrent,
}

/// End of a slot: the combined `(date_start, time_start)` interpreted in the
/// fixed reference zone (UTC) plus the slot duration.
pub fn compute_end(date_start: NaiveDate, time_start: NaiveTime) -> DateTime<Utc> {
    date_start.and_time(time_start).and_utc() + Duration::minutes(SLOT_DURATION_MINUTES)
}

pub fn ensure_allowed_time(allowed: &[NaiveTime], time_start: NaiveTime) -> Result<(), BookingError> {
    if allowed.contains(&time_start) {
        Ok(())
    } else {
        Err(BookingError::InvalidSlotTime(Some(time_start)))
    }
}

/// Resolve a payload's slot reference. `current` is the booking's current slot
/// id on update, `None` on create.
///
/// The id always wins over the natural key. On update, a missing id or an id
/// equal to the current one leaves the binding untouched; the payload's
/// `time_start`/`date_start` are ignored in that case.
pub fn slot_directive(
    selector: &SlotSelector,
    current: Option<SlotId>,
) -> Result<SlotDirective, BookingError> {
    match (selector.id, current) {
        (Some(id), Some(bound)) if id == bound => Ok(SlotDirective::KeepCurrent),
        (Some(id), _) => Ok(SlotDirective::UseExisting(id)),
        (None, Some(_)) => Ok(SlotDirective::KeepCurrent),
        (None, None) => match (selector.time_start, selector.date_start) {
            (Some(time_start), Some(date_start)) => Ok(SlotDirective::ResolveNaturalKey {
                time_start,
                date_start,
            }),
            _ => Err(BookingError::InvalidSlotTime(None)),
        },
    }
}

/// Status carry-over: an omitted `filled` keeps the previous value; on create
/// (no previous value) it defaults to booked.
pub fn resolve_filled(requested: Option<bool>, previous: Option<bool>) -> bool {
    requested.unwrap_or_else(|| previous.unwrap_or(true))
}
