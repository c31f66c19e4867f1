use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::{
    backend::AppointmentBackend, configuration::Configuration,
    configuration_handler::ConfigurationHandler, database_backend::DatabaseBackend,
    http::create_app, local_backend::LocalBackend,
};

mod auth;
mod backend;
mod configuration;
mod configuration_handler;
mod database_backend;
mod error;
mod http;
mod local_backend;
mod notify;
mod policy;
mod reconcile;
mod schema;
#[cfg(test)]
mod testutils;
mod types;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let configuration = ConfigurationHandler::parse_arguments();

    let address = format!("0.0.0.0:{}", configuration.port());
    let listener = tokio::net::TcpListener::bind(&address).await.unwrap();
    info!("Accessible at: {address}");

    let app = if let Some(database_url) = configuration.database_url() {
        let backend = loop {
            match DatabaseBackend::new(&database_url, configuration.allowed_times()) {
                Ok(backend) => {
                    info!("Successfully connected to database");
                    break backend;
                }
                Err(err) => {
                    error!(?err, "Failed to establish database connection: {database_url}. Retry in 1 sec. You may want to restart without a database (impersistent slots).");
                    sleep(Duration::from_secs(1)).await;
                }
            }
        };
        backend.insert_example_slots();
        create_app(backend, &configuration)
    } else {
        let backend = LocalBackend::new(configuration.allowed_times());
        backend.insert_example_slots();
        create_app(backend, &configuration)
    };

    axum::serve(listener, app).await.unwrap();
}
