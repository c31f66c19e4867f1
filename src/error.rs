use chrono::NaiveTime;

use crate::types::{AppointmentId, SlotId};

#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    /// Requested start time is not in the configured allowed set.
    InvalidSlotTime(Option<NaiveTime>),
    /// A slot with the same `(time_start, date_start)` already exists.
    DuplicateSlot,
    /// The resolved slot already hosts a booking.
    SlotAlreadyBooked(SlotId),
    SlotNotFound(SlotId),
    AppointmentNotFound(AppointmentId),
    /// Write attempt by a non-owner.
    Forbidden,
    Unauthenticated,
    /// Persistence-layer failure unrelated to the booking invariants.
    Storage(String),
}

impl BookingError {
    /// Stable machine-readable code used in error response payloads.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::InvalidSlotTime(_) => "invalid_slot_time",
            BookingError::DuplicateSlot => "duplicate_slot",
            BookingError::SlotAlreadyBooked(_) => "slot_already_booked",
            BookingError::SlotNotFound(_) | BookingError::AppointmentNotFound(_) => "not_found",
            BookingError::Forbidden => "forbidden",
            BookingError::Unauthenticated => "unauthenticated",
            BookingError::Storage(_) => "storage",
        }
    }
}

impl std::fmt::Display for BookingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingError::InvalidSlotTime(Some(time)) => {
                write!(f, "start time {time} is not a bookable slot time")
            }
            BookingError::InvalidSlotTime(None) => {
                write!(f, "slot requires time_start and date_start")
            }
            BookingError::DuplicateSlot => {
                write!(f, "a slot with this start time and date already exists")
            }
            BookingError::SlotAlreadyBooked(id) => write!(f, "slot {id} is already booked"),
            BookingError::SlotNotFound(id) => write!(f, "slot not found: {id}"),
            BookingError::AppointmentNotFound(id) => write!(f, "appointment not found: {id}"),
            BookingError::Forbidden => write!(f, "only the owner may modify this appointment"),
            BookingError::Unauthenticated => write!(f, "authentication required"),
            BookingError::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl std::error::Error for BookingError {}
