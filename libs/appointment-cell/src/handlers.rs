use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::{AppError, AppointmentId};
use shared_store::ClinicStore;

use crate::models::{
    AttachMedicalRecordRequest, BookAppointmentRequest, ListQuery, UpdateAppointmentRequest,
    UpdateStatusRequest,
};
use crate::services::{BookingService, LifecycleService};

pub async fn book_appointment(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    let appointment = service.book_appointment(request).await?;
    Ok(Json(json!(appointment)))
}

pub async fn get_appointment(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    let appointment = service.get_appointment(appointment_id).await?;
    Ok(Json(json!(appointment)))
}

pub async fn list_appointments(
    State(store): State<Arc<ClinicStore>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    let appointments = service.list_appointments(query.offset, query.limit).await;
    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

pub async fn update_appointment(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    let appointment = service.update_appointment(appointment_id, request).await?;
    Ok(Json(json!(appointment)))
}

pub async fn delete_appointment(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    service.delete_appointment(appointment_id).await?;
    Ok(Json(json!({ "deleted": appointment_id })))
}

pub async fn update_status(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(store);
    let appointment = service.set_status(appointment_id, request.status).await?;
    Ok(Json(json!(appointment)))
}

pub async fn attach_medical_record(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
    Json(request): Json<AttachMedicalRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(store);
    let record = service.attach_medical_record(appointment_id, request).await?;
    Ok(Json(json!(record)))
}

pub async fn get_medical_record(
    State(store): State<Arc<ClinicStore>>,
    Path(appointment_id): Path<AppointmentId>,
) -> Result<Json<Value>, AppError> {
    let service = LifecycleService::new(store);
    let record = service.medical_record(appointment_id).await?;
    Ok(Json(json!(record)))
}

pub async fn upcoming_appointments(
    State(store): State<Arc<ClinicStore>>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(store);
    let upcoming = service.upcoming_appointments().await;
    Ok(Json(json!({
        "upcoming": upcoming,
        "total": upcoming.len()
    })))
}
