use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use shared_store::ClinicStore;

use crate::handlers::*;

pub fn appointment_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/", post(book_appointment))
        .route("/", get(list_appointments))
        .route("/upcoming", get(upcoming_appointments))
        .route("/{id}", get(get_appointment))
        .route("/{id}", put(update_appointment))
        .route("/{id}", delete(delete_appointment))
        .route("/{id}/status", put(update_status))
        .route("/{id}/medical-record", post(attach_medical_record))
        .route("/{id}/medical-record", get(get_medical_record))
        .with_state(store)
}
