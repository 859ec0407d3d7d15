use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::{json, Value};

use shared_models::{AppError, ClinicId, DoctorId, SpecialtyId};
use shared_store::ClinicStore;

use crate::models::{
    CreateClinicRequest, CreateDoctorRequest, CreateSpecialtyRequest, ListQuery,
    UpdateClinicRequest, UpdateDoctorRequest, UpdateSpecialtyRequest,
};
use crate::services::DirectoryService;

// ----- doctors --------------------------------------------------------------

pub async fn create_doctor(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let doctor = service.create_doctor(request).await?;
    Ok(Json(json!(doctor)))
}

pub async fn get_doctor(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<DoctorId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let doctor = service.get_doctor(doctor_id).await?;
    Ok(Json(json!(doctor)))
}

pub async fn list_doctors(
    State(store): State<Arc<ClinicStore>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let doctors = service.list_doctors(query.offset, query.limit).await;
    Ok(Json(json!({
        "doctors": doctors,
        "total": doctors.len()
    })))
}

pub async fn update_doctor(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<DoctorId>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let doctor = service.update_doctor(doctor_id, request).await?;
    Ok(Json(json!(doctor)))
}

pub async fn delete_doctor(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<DoctorId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.delete_doctor(doctor_id).await?;
    Ok(Json(json!({ "deleted": doctor_id })))
}

// ----- assignments ----------------------------------------------------------

pub async fn assign_specialty(
    State(store): State<Arc<ClinicStore>>,
    Path((doctor_id, specialty_id)): Path<(DoctorId, SpecialtyId)>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.assign_specialty(doctor_id, specialty_id).await?;
    Ok(Json(json!({ "doctor_id": doctor_id, "specialty_id": specialty_id })))
}

pub async fn unassign_specialty(
    State(store): State<Arc<ClinicStore>>,
    Path((doctor_id, specialty_id)): Path<(DoctorId, SpecialtyId)>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.unassign_specialty(doctor_id, specialty_id).await?;
    Ok(Json(json!({ "removed": true })))
}

pub async fn list_doctor_specialties(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<DoctorId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let specialties = service.doctor_specialties(doctor_id).await?;
    Ok(Json(json!(specialties)))
}

pub async fn assign_clinic(
    State(store): State<Arc<ClinicStore>>,
    Path((doctor_id, clinic_id)): Path<(DoctorId, ClinicId)>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.assign_clinic(doctor_id, clinic_id).await?;
    Ok(Json(json!({ "doctor_id": doctor_id, "clinic_id": clinic_id })))
}

pub async fn unassign_clinic(
    State(store): State<Arc<ClinicStore>>,
    Path((doctor_id, clinic_id)): Path<(DoctorId, ClinicId)>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.unassign_clinic(doctor_id, clinic_id).await?;
    Ok(Json(json!({ "removed": true })))
}

pub async fn list_doctor_clinics(
    State(store): State<Arc<ClinicStore>>,
    Path(doctor_id): Path<DoctorId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let clinics = service.doctor_clinics(doctor_id).await?;
    Ok(Json(json!(clinics)))
}

// ----- clinics --------------------------------------------------------------

pub async fn create_clinic(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let clinic = service.create_clinic(request).await?;
    Ok(Json(json!(clinic)))
}

pub async fn get_clinic(
    State(store): State<Arc<ClinicStore>>,
    Path(clinic_id): Path<ClinicId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let clinic = service.get_clinic(clinic_id).await?;
    Ok(Json(json!(clinic)))
}

pub async fn list_clinics(
    State(store): State<Arc<ClinicStore>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let clinics = service.list_clinics(query.offset, query.limit).await;
    Ok(Json(json!({
        "clinics": clinics,
        "total": clinics.len()
    })))
}

pub async fn update_clinic(
    State(store): State<Arc<ClinicStore>>,
    Path(clinic_id): Path<ClinicId>,
    Json(request): Json<UpdateClinicRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let clinic = service.update_clinic(clinic_id, request).await?;
    Ok(Json(json!(clinic)))
}

pub async fn delete_clinic(
    State(store): State<Arc<ClinicStore>>,
    Path(clinic_id): Path<ClinicId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.delete_clinic(clinic_id).await?;
    Ok(Json(json!({ "deleted": clinic_id })))
}

// ----- specialties ----------------------------------------------------------

pub async fn create_specialty(
    State(store): State<Arc<ClinicStore>>,
    Json(request): Json<CreateSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let specialty = service.create_specialty(request).await?;
    Ok(Json(json!(specialty)))
}

pub async fn get_specialty(
    State(store): State<Arc<ClinicStore>>,
    Path(specialty_id): Path<SpecialtyId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let specialty = service.get_specialty(specialty_id).await?;
    Ok(Json(json!(specialty)))
}

pub async fn list_specialties(
    State(store): State<Arc<ClinicStore>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let specialties = service.list_specialties(query.offset, query.limit).await;
    Ok(Json(json!({
        "specialties": specialties,
        "total": specialties.len()
    })))
}

pub async fn update_specialty(
    State(store): State<Arc<ClinicStore>>,
    Path(specialty_id): Path<SpecialtyId>,
    Json(request): Json<UpdateSpecialtyRequest>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    let specialty = service.update_specialty(specialty_id, request).await?;
    Ok(Json(json!(specialty)))
}

pub async fn delete_specialty(
    State(store): State<Arc<ClinicStore>>,
    Path(specialty_id): Path<SpecialtyId>,
) -> Result<Json<Value>, AppError> {
    let service = DirectoryService::new(store);
    service.delete_specialty(specialty_id).await?;
    Ok(Json(json!({ "deleted": specialty_id })))
}
