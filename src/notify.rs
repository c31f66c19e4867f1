//! Out-of-band booking notifications. Delivery is fire-and-forget: the write
//! path spawns the send and never blocks or fails on dispatch errors.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct Mail {
    pub subject: String,
    pub body: String,
    pub from: String,
    pub to: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
pub trait Mailer: Send + Sync + 'static {
    fn send(&self, mail: &Mail) -> Result<(), String>;
}

/// Default delivery: the mail is written to the log. Real transports plug in
/// behind the [`Mailer`] trait.
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, mail: &Mail) -> Result<(), String> {
        info!(
            subject = %mail.subject,
            to = ?mail.to,
            from = %mail.from,
            "notification: {}",
            mail.body
        );
        Ok(())
    }
}

/// Spawns the delivery attempt. Failures are logged, never propagated.
pub fn dispatch(mailer: Arc<dyn Mailer>, mail: Mail) {
    tokio::spawn(async move {
        if let Err(err) = mailer.send(&mail) {
            warn!(subject = %mail.subject, "notification delivery failed: {err}");
        }
    });
}

pub fn booked_mail(
    from: &str,
    to: &str,
    username: &str,
    date_start: NaiveDate,
    time_start: NaiveTime,
) -> Mail {
    Mail {
        subject: "New Appointment".into(),
        body: format!(
            "Hello {username} you have booked an appointment on {date_start} at {time_start}"
        ),
        from: from.into(),
        to: vec![to.into()],
    }
}

pub fn changed_mail(
    from: &str,
    to: &str,
    username: &str,
    previous: (NaiveDate, NaiveTime),
    current: (NaiveDate, NaiveTime),
) -> Mail {
    Mail {
        subject: "Changed Appointment".into(),
        body: format!(
            "Hello {username} you have changed your appointment from {} at {} to {} at {}",
            previous.0, previous.1, current.0, current.1
        ),
        from: from.into(),
        to: vec![to.into()],
    }
}

pub fn deleted_mail(
    from: &str,
    to: &str,
    username: &str,
    date_start: NaiveDate,
    time_start: NaiveTime,
) -> Mail {
    Mail {
        subject: "Deleted Appointment".into(),
        body: format!(
            "Hello {username} you have deleted an appointment on {date_start} at {time_start}"
        ),
        from: from.into(),
        to: vec![to.into()],
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use chrono::NaiveDate;
    use mockall::predicate::*;
    use std::time::Duration;

    fn slot_key() -> (NaiveDate, NaiveTime) {
        (
            NaiveDate::from_ymd_opt(2020, 1, 12).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        )
    }

    #[test]
    fn booked_mail_names_user_and_slot() {
        let (date_start, time_start) = slot_key();
        let mail = booked_mail(
            "from@example.com",
            "test@example.com",
            "test",
            date_start,
            time_start,
        );
        assert_eq!(mail.subject, "New Appointment");
        assert_eq!(
            mail.body,
            "Hello test you have booked an appointment on 2020-01-12 at 09:00:00"
        );
        assert_eq!(mail.to, vec!["test@example.com".to_string()]);
    }

    #[tokio::test]
    async fn dispatch_delivers_once() {
        let (date_start, time_start) = slot_key();
        let mail = booked_mail("a@x", "b@x", "test", date_start, time_start);

        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .with(eq(mail.clone()))
            .times(1)
            .returning(|_| Ok(()));

        dispatch(Arc::new(mailer), mail);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    #[tokio::test]
    async fn dispatch_swallows_delivery_failure() {
        let (date_start, time_start) = slot_key();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .times(1)
            .returning(|_| Err("smtp down".into()));

        dispatch(
            Arc::new(mailer),
            deleted_mail("a@x", "b@x", "test", date_start, time_start),
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
