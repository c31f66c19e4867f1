//! Owner-or-read-only access policy. Reads are open to any authenticated
//! client; writes are restricted to the booking's current owner.

use crate::error::BookingError;
use crate::types::Appointment;

pub fn can_modify(appointment: &Appointment, requester: &str) -> bool {
    appointment.client == requester
}

pub fn ensure_can_modify(appointment: &Appointment, requester: &str) -> Result<(), BookingError> {
    if can_modify(appointment, requester) {
        Ok(())
    } else {
        Err(BookingError::Forbidden)
    }
}
