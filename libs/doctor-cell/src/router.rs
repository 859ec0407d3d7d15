use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use shared_store::ClinicStore;

use crate::handlers::*;

pub fn doctor_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/", post(create_doctor))
        .route("/", get(list_doctors))
        .route("/{id}", get(get_doctor))
        .route("/{id}", put(update_doctor))
        .route("/{id}", delete(delete_doctor))
        .route("/{id}/specialties", get(list_doctor_specialties))
        .route("/{id}/specialties/{specialty_id}", post(assign_specialty))
        .route("/{id}/specialties/{specialty_id}", delete(unassign_specialty))
        .route("/{id}/clinics", get(list_doctor_clinics))
        .route("/{id}/clinics/{clinic_id}", post(assign_clinic))
        .route("/{id}/clinics/{clinic_id}", delete(unassign_clinic))
        .with_state(store)
}

pub fn clinic_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/", post(create_clinic))
        .route("/", get(list_clinics))
        .route("/{id}", get(get_clinic))
        .route("/{id}", put(update_clinic))
        .route("/{id}", delete(delete_clinic))
        .with_state(store)
}

pub fn specialty_routes(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/", post(create_specialty))
        .route("/", get(list_specialties))
        .route("/{id}", get(get_specialty))
        .route("/{id}", put(update_specialty))
        .route("/{id}", delete(delete_specialty))
        .with_state(store)
}
