use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Path, Request, State};
use axum::http::{header, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{Html, IntoResponse, Response};
use axum::{
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::fs;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::auth::SessionManager;
use crate::backend::AppointmentBackend;
use crate::configuration::Configuration;
use crate::error::BookingError;
use crate::notify::{self, Mail, Mailer};
use crate::policy;
use crate::types::{Appointment, AppointmentChange, AppointmentId, Slot, SlotId};

#[derive(Clone)]
pub struct AppState<T: AppointmentBackend> {
    backend: T,
    sessions: SessionManager,
    mailer: Arc<dyn Mailer>,
    mail_sender: String,
    admin_password: String,
    frontend_path: PathBuf,
}

/// The authenticated requester, injected by the auth middleware.
#[derive(Debug, Clone)]
pub struct AuthUser(pub String);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoginResponse {
    token: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct AddSlotRequest {
    time_start: NaiveTime,
    date_start: NaiveDate,
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let status = match &self {
            BookingError::InvalidSlotTime(_)
            | BookingError::DuplicateSlot
            | BookingError::SlotAlreadyBooked(_) => StatusCode::BAD_REQUEST,
            BookingError::SlotNotFound(_) | BookingError::AppointmentNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            BookingError::Forbidden | BookingError::Unauthenticated => StatusCode::FORBIDDEN,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = Json(json!({ "error": self.code(), "message": self.to_string() }));
        (status, body).into_response()
    }
}

pub fn create_app<T: AppointmentBackend, C: Configuration>(
    backend: T,
    configuration: &C,
) -> Router {
    let state = AppState {
        backend,
        sessions: SessionManager::new(configuration.accounts()),
        mailer: Arc::new(notify::LogMailer),
        mail_sender: configuration.mail_sender(),
        admin_password: configuration.admin_password(),
        frontend_path: configuration.frontend_path(),
    };
    router(state)
}

fn router<T: AppointmentBackend>(state: AppState<T>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let public = Router::new()
        .route("/login", post(login))
        .route("/frontend", get(get_frontend));

    let client = Router::new()
        .route(
            "/appointments",
            get(appointment_list).post(appointment_create),
        )
        .route(
            "/appointments/:id",
            get(appointment_detail)
                .put(appointment_update)
                .delete(appointment_delete),
        )
        .route("/slots", get(slot_list))
        .route("/slots/:id", get(slot_detail))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            client_auth::<T>,
        ));

    let admin = Router::new()
        .route("/admin/slots", post(slot_add))
        .route("/admin/slots/:id", delete(slot_remove))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth::<T>,
        ));

    Router::new()
        .merge(public)
        .merge(client)
        .merge(admin)
        .with_state(state)
        .layer(cors)
}

async fn client_auth<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, BookingError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .and_then(|raw| Uuid::parse_str(raw.trim()).ok())
        .ok_or(BookingError::Unauthenticated)?;

    let username = state
        .sessions
        .resolve(token)
        .ok_or(BookingError::Unauthenticated)?;

    request.extensions_mut().insert(AuthUser(username));
    Ok(next.run(request).await)
}

async fn admin_auth<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, (StatusCode, String)> {
    match request.headers().get("x-admin-password") {
        Some(header) if header.to_str().unwrap_or("") == state.admin_password => {
            Ok(next.run(request).await)
        }
        Some(_) => Err((StatusCode::UNAUTHORIZED, "Unauthorized".to_string())),
        None => Err((StatusCode::UNAUTHORIZED, "Missing credentials".to_string())),
    }
}

async fn login<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, String)> {
    match state.sessions.login(&request.username, &request.password) {
        Some(token) => Ok(Json(LoginResponse { token })),
        None => Err((
            StatusCode::UNAUTHORIZED,
            "Invalid username or password".to_string(),
        )),
    }
}

/// Delivery is out of band; a missing account email only skips the mail.
fn send_notification<T: AppointmentBackend>(
    state: &AppState<T>,
    username: &str,
    build: impl FnOnce(&str, &str) -> Mail,
) {
    if let Some(email) = state.sessions.email_of(username) {
        notify::dispatch(state.mailer.clone(), build(&state.mail_sender, &email));
    }
}

async fn appointment_list<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<Appointment>>, BookingError> {
    Ok(Json(state.backend.appointments()?))
}

async fn appointment_create<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    Json(change): Json<AppointmentChange>,
) -> Result<impl IntoResponse, BookingError> {
    let appointment = state.backend.create_appointment(&change, &username)?;
    send_notification(&state, &username, |from, to| {
        notify::booked_mail(
            from,
            to,
            &username,
            appointment.times.date_start,
            appointment.times.time_start,
        )
    });
    Ok((StatusCode::CREATED, Json(appointment)))
}

async fn appointment_detail<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Path(id): Path<AppointmentId>,
) -> Result<Json<Appointment>, BookingError> {
    Ok(Json(state.backend.appointment(id)?))
}

async fn appointment_update<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    Path(id): Path<AppointmentId>,
    Json(change): Json<AppointmentChange>,
) -> Result<Json<Appointment>, BookingError> {
    let current = state.backend.appointment(id)?;
    policy::ensure_can_modify(&current, &username)?;

    let updated = state.backend.update_appointment(id, &change, &username)?;
    send_notification(&state, &username, |from, to| {
        notify::changed_mail(
            from,
            to,
            &username,
            (current.times.date_start, current.times.time_start),
            (updated.times.date_start, updated.times.time_start),
        )
    });
    Ok(Json(updated))
}

async fn appointment_delete<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Extension(AuthUser(username)): Extension<AuthUser>,
    Path(id): Path<AppointmentId>,
) -> Result<StatusCode, BookingError> {
    let appointment = state.backend.appointment(id)?;
    policy::ensure_can_modify(&appointment, &username)?;

    state.backend.delete_appointment(id)?;
    send_notification(&state, &username, |from, to| {
        notify::deleted_mail(
            from,
            to,
            &username,
            appointment.times.date_start,
            appointment.times.time_start,
        )
    });
    Ok(StatusCode::NO_CONTENT)
}

async fn slot_list<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
) -> Result<Json<Vec<Slot>>, BookingError> {
    Ok(Json(state.backend.slots()?))
}

async fn slot_detail<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Path(id): Path<SlotId>,
) -> Result<Json<Slot>, BookingError> {
    Ok(Json(state.backend.slot(id)?))
}

async fn slot_add<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Json(request): Json<AddSlotRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let slot = state
        .backend
        .add_slot(request.time_start, request.date_start)?;
    Ok((StatusCode::CREATED, Json(slot)))
}

async fn slot_remove<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
    Path(id): Path<SlotId>,
) -> Result<StatusCode, BookingError> {
    state.backend.remove_slot(id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_frontend<T: AppointmentBackend>(
    State(state): State<AppState<T>>,
) -> Result<Html<String>, (StatusCode, String)> {
    match fs::read_to_string(&state.frontend_path).await {
        Ok(contents) => Ok(Html(contents)),
        Err(err) => {
            let error_message = format!("Failed to read frontend file: {err}");
            Err((StatusCode::INTERNAL_SERVER_ERROR, error_message))
        }
    }
}
