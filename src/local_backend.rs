use chrono::{Local, NaiveDate, NaiveTime};
use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use crate::backend::AppointmentBackend;
use crate::error::BookingError;
use crate::reconcile::{compute_end, ensure_allowed_time, slot_directive, resolve_filled, SlotDirective};
use crate::types::{Appointment, AppointmentChange, AppointmentId, Slot, SlotId};

/// Booking state without the joined slot; the slot lives in `Inner::slots`.
#[derive(Debug, Clone)]
struct AppointmentRecord {
    id: AppointmentId,
    slot_id: SlotId,
    filled: bool,
    client: String,
}

#[derive(Debug, Default)]
struct Inner {
    slots: HashMap<SlotId, Slot>,
    appointments: HashMap<AppointmentId, AppointmentRecord>,
    next_slot_id: SlotId,
    next_appointment_id: AppointmentId,
}

/// In-memory backend. All invariant checks and writes for one operation
/// happen under a single mutex hold, so interleaved requests observe the
/// same serializability as the database-backed variant.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    inner: Arc<Mutex<Inner>>,
    allowed_times: Arc<Vec<NaiveTime>>,
}

impl Inner {
    fn next_slot_id(&mut self) -> SlotId {
        self.next_slot_id += 1;
        self.next_slot_id
    }

    fn next_appointment_id(&mut self) -> AppointmentId {
        self.next_appointment_id += 1;
        self.next_appointment_id
    }

    fn slot_by_natural_key(&self, time_start: NaiveTime, date_start: NaiveDate) -> Option<Slot> {
        self.slots
            .values()
            .find(|slot| slot.time_start == time_start && slot.date_start == date_start)
            .cloned()
    }

    fn booking_for_slot(&self, slot_id: SlotId) -> Option<AppointmentId> {
        self.appointments
            .values()
            .find(|record| record.slot_id == slot_id)
            .map(|record| record.id)
    }

    fn insert_slot(&mut self, time_start: NaiveTime, date_start: NaiveDate) -> Slot {
        let id = self.next_slot_id();
        let slot = Slot {
            id,
            time_start,
            date_start,
            time_end: compute_end(date_start, time_start),
        };
        self.slots.insert(id, slot.clone());
        slot
    }

    fn join(&self, record: &AppointmentRecord) -> Result<Appointment, BookingError> {
        let times = self
            .slots
            .get(&record.slot_id)
            .cloned()
            .ok_or_else(|| BookingError::Storage(format!("slot {} missing", record.slot_id)))?;
        Ok(Appointment {
            id: record.id,
            times,
            filled: record.filled,
            client: record.client.clone(),
        })
    }
}

impl LocalBackend {
    pub fn new(allowed_times: Vec<NaiveTime>) -> Self {
        Self {
            inner: Arc::default(),
            allowed_times: Arc::new(allowed_times),
        }
    }
}

impl AppointmentBackend for LocalBackend {
    fn insert_example_slots(&self) {
        const NUMBER_OF_DAYS: i64 = 5;
        for day in 1..=NUMBER_OF_DAYS {
            let date_start = (Local::now() + chrono::Duration::days(day)).date_naive();
            for &time_start in self.allowed_times.iter() {
                let _ = self.add_slot(time_start, date_start);
            }
        }
    }

    fn slots(&self) -> Result<Vec<Slot>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut slots: Vec<Slot> = inner.slots.values().cloned().collect();
        slots.sort_by_key(|slot| slot.id);
        Ok(slots)
    }

    fn slot(&self, id: SlotId) -> Result<Slot, BookingError> {
        let inner = self.inner.lock().unwrap();
        inner
            .slots
            .get(&id)
            .cloned()
            .ok_or(BookingError::SlotNotFound(id))
    }

    fn add_slot(
        &self,
        time_start: NaiveTime,
        date_start: NaiveDate,
    ) -> Result<Slot, BookingError> {
        ensure_allowed_time(&self.allowed_times, time_start)?;
        let mut inner = self.inner.lock().unwrap();
        if inner.slot_by_natural_key(time_start, date_start).is_some() {
            return Err(BookingError::DuplicateSlot);
        }
        Ok(inner.insert_slot(time_start, date_start))
    }

    fn remove_slot(&self, id: SlotId) -> Result<(), BookingError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.slots.remove(&id).is_none() {
            return Err(BookingError::SlotNotFound(id));
        }
        inner.appointments.retain(|_, record| record.slot_id != id);
        Ok(())
    }

    fn appointments(&self) -> Result<Vec<Appointment>, BookingError> {
        let inner = self.inner.lock().unwrap();
        let mut appointments = inner
            .appointments
            .values()
            .map(|record| inner.join(record))
            .collect::<Result<Vec<_>, _>>()?;
        appointments.sort_by_key(|appointment| appointment.id);
        Ok(appointments)
    }

    fn appointment(&self, id: AppointmentId) -> Result<Appointment, BookingError> {
        let inner = self.inner.lock().unwrap();
        let record = inner
            .appointments
            .get(&id)
            .ok_or(BookingError::AppointmentNotFound(id))?;
        inner.join(record)
    }

    fn create_appointment(
        &self,
        change: &AppointmentChange,
        client: &str,
    ) -> Result<Appointment, BookingError> {
        let mut inner = self.inner.lock().unwrap();
        let slot = match slot_directive(&change.times, None)? {
            SlotDirective::UseExisting(id) => inner
                .slots
                .get(&id)
                .cloned()
                .ok_or(BookingError::SlotNotFound(id))?,
            SlotDirective::ResolveNaturalKey {
                time_start,
                date_start,
            } => {
                ensure_allowed_time(&self.allowed_times, time_start)?;
                match inner.slot_by_natural_key(time_start, date_start) {
                    Some(slot) => slot,
                    None => inner.insert_slot(time_start, date_start),
                }
            }
            // No current binding exists on create; a payload that resolves to
            // "keep" carries no usable slot reference.
            SlotDirective::KeepCurrent => return Err(BookingError::InvalidSlotTime(None)),
        };

        if inner.booking_for_slot(slot.id).is_some() {
            return Err(BookingError::SlotAlreadyBooked(slot.id));
        }

        let id = inner.next_appointment_id();
        let record = AppointmentRecord {
            id,
            slot_id: slot.id,
            filled: resolve_filled(change.filled, None),
            client: client.into(),
        };
        inner.appointments.insert(id, record.clone());
        Ok(Appointment {
            id,
            times: slot,
            filled: record.filled,
            client: record.client,
        })
    }

    fn update_appointment(
        &self,
        id: AppointmentId,
        change: &AppointmentChange,
        requester: &str,
    ) -> Result<Appointment, BookingError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .appointments
            .get(&id)
            .cloned()
            .ok_or(BookingError::AppointmentNotFound(id))?;

        let slot_id = match slot_directive(&change.times, Some(record.slot_id))? {
            SlotDirective::UseExisting(target) => {
                if !inner.slots.contains_key(&target) {
                    return Err(BookingError::SlotNotFound(target));
                }
                match inner.booking_for_slot(target) {
                    Some(holder) if holder != id => {
                        return Err(BookingError::SlotAlreadyBooked(target))
                    }
                    _ => target,
                }
            }
            // A natural key without an id never re-points an existing binding.
            SlotDirective::KeepCurrent | SlotDirective::ResolveNaturalKey { .. } => record.slot_id,
        };

        let updated = AppointmentRecord {
            id,
            slot_id,
            filled: resolve_filled(change.filled, Some(record.filled)),
            client: requester.into(),
        };
        inner.appointments.insert(id, updated.clone());
        inner.join(&updated)
    }

    fn delete_appointment(&self, id: AppointmentId) -> Result<(), BookingError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.appointments.remove(&id).is_none() {
            return Err(BookingError::AppointmentNotFound(id));
        }
        Ok(())
    }
}
