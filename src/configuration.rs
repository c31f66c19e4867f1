use std::path::PathBuf;

use chrono::NaiveTime;

use crate::auth::Account;

pub trait Configuration: Clone + Send + Sync + 'static {
    /// The enumerated set of bookable start times.
    fn allowed_times(&self) -> Vec<NaiveTime>;
    fn accounts(&self) -> Vec<Account>;
    fn admin_password(&self) -> String;
    fn mail_sender(&self) -> String;
    fn frontend_path(&self) -> PathBuf;
    fn database_url(&self) -> Option<String>;
    fn port(&self) -> String;
}
