use std::path::PathBuf;

use chrono::NaiveTime;
use clap::Parser;

use crate::auth::Account;
use crate::configuration::Configuration;

pub fn default_allowed_times() -> Vec<NaiveTime> {
    [(9, 0), (11, 0), (15, 0)]
        .into_iter()
        .map(|(hour, minute)| NaiveTime::from_hms_opt(hour, minute, 0).unwrap())
        .collect()
}

/// `user:password:email` entries separated by commas. Malformed entries are
/// skipped.
fn parse_accounts(raw: &str) -> Vec<Account> {
    raw.split(',')
        .filter_map(|entry| {
            let mut parts = entry.trim().splitn(3, ':');
            Some(Account {
                username: parts.next()?.to_string(),
                password: parts.next()?.to_string(),
                email: parts.next()?.to_string(),
            })
        })
        .collect()
}

#[derive(Parser, Clone, Debug)]
#[command(about = "Appointment booking API")]
pub struct ConfigurationHandler {
    #[arg(long, default_value = "3000")]
    port: String,

    /// PostgreSQL connection URL. Without it, bookings are held in memory.
    #[arg(long)]
    database_url: Option<String>,

    #[arg(long, default_value = "../frontend/index.html")]
    frontend_path: PathBuf,

    #[arg(long, default_value = "123")]
    admin_password: String,

    #[arg(long, default_value = "from@example.com")]
    mail_sender: String,

    /// Bookable start times, repeatable (HH:MM:SS).
    #[arg(long = "allowed-time", default_values_t = default_allowed_times())]
    allowed_times: Vec<NaiveTime>,

    /// Client accounts as `user:password:email`, comma separated.
    #[arg(long)]
    accounts: Option<String>,
}

impl ConfigurationHandler {
    pub fn parse_arguments() -> Self {
        Self::parse()
    }
}

impl Configuration for ConfigurationHandler {
    fn allowed_times(&self) -> Vec<NaiveTime> {
        self.allowed_times.clone()
    }

    fn accounts(&self) -> Vec<Account> {
        let raw = self
            .accounts
            .clone()
            .or_else(|| std::env::var("APP_ACCOUNTS").ok());
        match raw {
            Some(raw) => parse_accounts(&raw),
            None => vec![Account {
                username: "test".into(),
                password: "test".into(),
                email: "test@example.com".into(),
            }],
        }
    }

    fn admin_password(&self) -> String {
        self.admin_password.clone()
    }

    fn mail_sender(&self) -> String {
        self.mail_sender.clone()
    }

    fn frontend_path(&self) -> PathBuf {
        self.frontend_path.clone()
    }

    fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }

    fn port(&self) -> String {
        self.port.clone()
    }
}
