use chrono::{NaiveDate, NaiveTime};

use crate::error::BookingError;
use crate::types::{Appointment, AppointmentChange, AppointmentId, Slot, SlotId};

/// Storage backend for slots and their bookings. Every mutating operation is
/// atomic: a reader never observes a partially applied create or update.
pub trait AppointmentBackend: Clone + Send + Sync + 'static {
    fn insert_example_slots(&self);

    fn slots(&self) -> Result<Vec<Slot>, BookingError>;

    fn slot(&self, id: SlotId) -> Result<Slot, BookingError>;

    /// Explicit slot creation. Fails with `DuplicateSlot` when the
    /// `(time_start, date_start)` natural key already exists and with
    /// `InvalidSlotTime` when the time is not in the allowed set.
    fn add_slot(&self, time_start: NaiveTime, date_start: NaiveDate)
        -> Result<Slot, BookingError>;

    /// Removes a slot and cascades to its booking, if any.
    fn remove_slot(&self, id: SlotId) -> Result<(), BookingError>;

    fn appointments(&self) -> Result<Vec<Appointment>, BookingError>;

    fn appointment(&self, id: AppointmentId) -> Result<Appointment, BookingError>;

    /// Books a slot for `client`. The slot reference is resolved per
    /// [`crate::reconcile::slot_directive`]; the resolved slot must not
    /// already host a booking.
    fn create_appointment(
        &self,
        change: &AppointmentChange,
        client: &str,
    ) -> Result<Appointment, BookingError>;

    /// Applies a partial update. Slot re-pointing, status carry-over and the
    /// ownership transfer to `requester` follow [`crate::reconcile`]; access
    /// policy is the caller's responsibility and is checked against the
    /// owner before this call.
    fn update_appointment(
        &self,
        id: AppointmentId,
        change: &AppointmentChange,
        requester: &str,
    ) -> Result<Appointment, BookingError>;

    /// Deletes the booking only; its slot stays available for rebooking.
    fn delete_appointment(&self, id: AppointmentId) -> Result<(), BookingError>;
}
