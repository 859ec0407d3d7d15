use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::{AppError, PatientId};
use shared_store::ClinicStore;

use crate::models::{CreatePatientRequest, ListQuery, UpdatePatientRequest};
use crate::services::PatientService;

pub async fn create_patient(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);
    let patient = service.create_patient(request).await?;
    Ok(Json(json!(patient)))
}

pub async fn get_patient(
    State(store): State<Arc<ClinicStore>>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);
    let patient = service.get_patient(patient_id).await?;
    Ok(Json(json!(patient)))
}

pub async fn list_patients(
    State(store): State<Arc<ClinicStore>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);
    let patients = service.list_patients(query.offset, query.limit).await;
    Ok(Json(json!({
        "patients": patients,
        "total": patients.len()
    })))
}

pub async fn update_patient(
    State(store): State<Arc<ClinicStore>>,
    Path(patient_id): Path<PatientId>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);
    let patient = service.update_patient(patient_id, request).await?;
    Ok(Json(json!(patient)))
}

pub async fn delete_patient(
    State(store): State<Arc<ClinicStore>>,
    Path(patient_id): Path<PatientId>,
) -> Result<Json<Value>, AppError> {
    let service = PatientService::new(store);
    service.delete_patient(patient_id).await?;
    Ok(Json(json!({ "deleted": patient_id })))
}
