use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use chrono::{NaiveDate, NaiveTime};

use crate::backend::AppointmentBackend;
use crate::error::BookingError;
use crate::notify::{Mail, Mailer};
use crate::reconcile::{compute_end, resolve_filled};
use crate::types::{Appointment, AppointmentChange, AppointmentId, Slot, SlotId};

#[derive(Default)]
pub struct MockBackendInner {
    /// When set, every fallible operation returns this error.
    pub error: Mutex<Option<BookingError>>,
    pub calls_to_insert_example_slots: AtomicU64,
    pub calls_to_slots: AtomicU64,
    pub calls_to_slot: AtomicU64,
    pub calls_to_add_slot: AtomicU64,
    pub calls_to_remove_slot: AtomicU64,
    pub calls_to_appointments: AtomicU64,
    pub calls_to_appointment: AtomicU64,
    pub calls_to_create_appointment: AtomicU64,
    pub calls_to_update_appointment: AtomicU64,
    pub calls_to_delete_appointment: AtomicU64,
    pub slots: Mutex<Vec<Slot>>,
    pub appointments: Mutex<Vec<Appointment>>,
}

#[derive(Clone, Default)]
pub struct MockBackend(pub Arc<MockBackendInner>);

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_with(&self, error: BookingError) {
        *self.0.error.lock().unwrap() = Some(error);
    }

    pub fn seed_slot(&self, id: SlotId, time_start: NaiveTime, date_start: NaiveDate) -> Slot {
        let slot = Slot {
            id,
            time_start,
            date_start,
            time_end: compute_end(date_start, time_start),
        };
        self.0.slots.lock().unwrap().push(slot.clone());
        slot
    }

    pub fn seed_appointment(&self, id: AppointmentId, slot: Slot, client: &str) -> Appointment {
        let appointment = Appointment {
            id,
            times: slot,
            filled: true,
            client: client.into(),
        };
        self.0
            .appointments
            .lock()
            .unwrap()
            .push(appointment.clone());
        appointment
    }

    fn check(&self) -> Result<(), BookingError> {
        match self.0.error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl AppointmentBackend for MockBackend {
    fn insert_example_slots(&self) {
        self.0
            .calls_to_insert_example_slots
            .fetch_add(1, Ordering::SeqCst);
    }

    fn slots(&self) -> Result<Vec<Slot>, BookingError> {
        self.0.calls_to_slots.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.0.slots.lock().unwrap().clone())
    }

    fn slot(&self, id: SlotId) -> Result<Slot, BookingError> {
        self.0.calls_to_slot.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.0
            .slots
            .lock()
            .unwrap()
            .iter()
            .find(|slot| slot.id == id)
            .cloned()
            .ok_or(BookingError::SlotNotFound(id))
    }

    fn add_slot(
        &self,
        time_start: NaiveTime,
        date_start: NaiveDate,
    ) -> Result<Slot, BookingError> {
        self.0.calls_to_add_slot.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let id = self.0.slots.lock().unwrap().len() as SlotId + 1;
        Ok(self.seed_slot(id, time_start, date_start))
    }

    fn remove_slot(&self, id: SlotId) -> Result<(), BookingError> {
        self.0.calls_to_remove_slot.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.0.slots.lock().unwrap().retain(|slot| slot.id != id);
        self.0
            .appointments
            .lock()
            .unwrap()
            .retain(|appointment| appointment.times.id != id);
        Ok(())
    }

    fn appointments(&self) -> Result<Vec<Appointment>, BookingError> {
        self.0.calls_to_appointments.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.0.appointments.lock().unwrap().clone())
    }

    fn appointment(&self, id: AppointmentId) -> Result<Appointment, BookingError> {
        self.0.calls_to_appointment.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.0
            .appointments
            .lock()
            .unwrap()
            .iter()
            .find(|appointment| appointment.id == id)
            .cloned()
            .ok_or(BookingError::AppointmentNotFound(id))
    }

    fn create_appointment(
        &self,
        change: &AppointmentChange,
        client: &str,
    ) -> Result<Appointment, BookingError> {
        self.0
            .calls_to_create_appointment
            .fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let times = self
            .0
            .slots
            .lock()
            .unwrap()
            .first()
            .cloned()
            .expect("mock backend needs a seeded slot for create_appointment");
        let mut appointments = self.0.appointments.lock().unwrap();
        let appointment = Appointment {
            id: appointments.len() as AppointmentId + 1,
            times,
            filled: resolve_filled(change.filled, None),
            client: client.into(),
        };
        appointments.push(appointment.clone());
        Ok(appointment)
    }

    fn update_appointment(
        &self,
        id: AppointmentId,
        change: &AppointmentChange,
        requester: &str,
    ) -> Result<Appointment, BookingError> {
        self.0
            .calls_to_update_appointment
            .fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut appointments = self.0.appointments.lock().unwrap();
        let appointment = appointments
            .iter_mut()
            .find(|appointment| appointment.id == id)
            .ok_or(BookingError::AppointmentNotFound(id))?;
        appointment.filled = resolve_filled(change.filled, Some(appointment.filled));
        appointment.client = requester.into();
        Ok(appointment.clone())
    }

    fn delete_appointment(&self, id: AppointmentId) -> Result<(), BookingError> {
        self.0
            .calls_to_delete_appointment
            .fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut appointments = self.0.appointments.lock().unwrap();
        if !appointments.iter().any(|appointment| appointment.id == id) {
            return Err(BookingError::AppointmentNotFound(id));
        }
        appointments.retain(|appointment| appointment.id != id);
        Ok(())
    }
}

/// Captures dispatched mails for assertions.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    pub sent: Arc<Mutex<Vec<Mail>>>,
}

impl Mailer for RecordingMailer {
    fn send(&self, mail: &Mail) -> Result<(), String> {
        self.sent.lock().unwrap().push(mail.clone());
        Ok(())
    }
}
