use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

pub type SlotId = i32;
pub type AppointmentId = i32;

/// A fixed half-hour calendar slot. `time_end` is derived from
/// `(date_start, time_start)` at write time and is never client-settable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub time_start: NaiveTime,
    pub date_start: NaiveDate,
    pub time_end: DateTime<Utc>,
}

/// A booking binding exactly one slot to exactly one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub times: Slot,
    pub filled: bool,
    pub client: String,
}

/// Client-supplied slot reference inside a create/update payload. An explicit
/// `id` takes priority over the `(time_start, date_start)` natural key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SlotId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_start: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_start: Option<NaiveDate>,
}

/// Create/update payload for an appointment. The owner is never part of the
/// payload; it is always injected from the authenticated requester.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppointmentChange {
    #[serde(default)]
    pub times: SlotSelector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filled: Option<bool>,
}
