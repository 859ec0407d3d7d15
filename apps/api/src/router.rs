use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::router::appointment_routes;
use doctor_cell::router::{clinic_routes, doctor_routes, specialty_routes};
use patient_cell::router::patient_routes;
use shared_store::ClinicStore;

pub fn create_router(store: Arc<ClinicStore>) -> Router {
    Router::new()
        .route("/", get(|| async { "Clinic booking API is running!" }))
        .nest("/patients", patient_routes(store.clone()))
        .nest("/doctors", doctor_routes(store.clone()))
        .nest("/clinics", clinic_routes(store.clone()))
        .nest("/specialties", specialty_routes(store.clone()))
        .nest("/appointments", appointment_routes(store))
}
