use std::sync::Arc;

use tracing::info;

use shared_models::{AppError, Clinic, ClinicId, Doctor, DoctorId, Specialty, SpecialtyId};
use shared_store::{
    ClinicStore, ClinicUpdate, DoctorUpdate, NewClinic, NewDoctor, NewSpecialty, SpecialtyUpdate,
};

use crate::models::{
    CreateClinicRequest, CreateDoctorRequest, CreateSpecialtyRequest, UpdateClinicRequest,
    UpdateDoctorRequest, UpdateSpecialtyRequest,
};

/// Directory of doctors, clinics and specialties, including the
/// many-to-many assignments between them.
pub struct DirectoryService {
    store: Arc<ClinicStore>,
}

impl DirectoryService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    // ----- doctors ----------------------------------------------------------

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, AppError> {
        let doctor = self
            .store
            .create_doctor(NewDoctor {
                first_name: request.first_name,
                last_name: request.last_name,
                phone: request.phone,
                email: request.email,
                bio: request.bio,
            })
            .await?;
        info!("Registered doctor {}", doctor.id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, id: DoctorId) -> Result<Doctor, AppError> {
        self.store.get_doctor(id).await
    }

    pub async fn list_doctors(&self, offset: usize, limit: usize) -> Vec<Doctor> {
        self.store.list_doctors(offset, limit).await
    }

    pub async fn update_doctor(
        &self,
        id: DoctorId,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, AppError> {
        self.store
            .update_doctor(
                id,
                DoctorUpdate {
                    first_name: request.first_name,
                    last_name: request.last_name,
                    phone: request.phone,
                    email: request.email,
                    bio: request.bio,
                },
            )
            .await
    }

    /// Cascades to the doctor's appointments, their medical records,
    /// and the doctor's specialty/clinic assignments.
    pub async fn delete_doctor(&self, id: DoctorId) -> Result<(), AppError> {
        self.store.delete_doctor(id).await?;
        info!("Deleted doctor {}", id);
        Ok(())
    }

    // ----- clinics ----------------------------------------------------------

    pub async fn create_clinic(&self, request: CreateClinicRequest) -> Result<Clinic, AppError> {
        self.store
            .create_clinic(NewClinic {
                name: request.name,
                address: request.address,
                phone: request.phone,
            })
            .await
    }

    pub async fn get_clinic(&self, id: ClinicId) -> Result<Clinic, AppError> {
        self.store.get_clinic(id).await
    }

    pub async fn list_clinics(&self, offset: usize, limit: usize) -> Vec<Clinic> {
        self.store.list_clinics(offset, limit).await
    }

    pub async fn update_clinic(
        &self,
        id: ClinicId,
        request: UpdateClinicRequest,
    ) -> Result<Clinic, AppError> {
        self.store
            .update_clinic(
                id,
                ClinicUpdate {
                    name: request.name,
                    address: request.address,
                    phone: request.phone,
                },
            )
            .await
    }

    pub async fn delete_clinic(&self, id: ClinicId) -> Result<(), AppError> {
        self.store.delete_clinic(id).await?;
        info!("Deleted clinic {}", id);
        Ok(())
    }

    // ----- specialties ------------------------------------------------------

    pub async fn create_specialty(
        &self,
        request: CreateSpecialtyRequest,
    ) -> Result<Specialty, AppError> {
        self.store
            .create_specialty(NewSpecialty {
                name: request.name,
                description: request.description,
            })
            .await
    }

    pub async fn get_specialty(&self, id: SpecialtyId) -> Result<Specialty, AppError> {
        self.store.get_specialty(id).await
    }

    pub async fn list_specialties(&self, offset: usize, limit: usize) -> Vec<Specialty> {
        self.store.list_specialties(offset, limit).await
    }

    pub async fn update_specialty(
        &self,
        id: SpecialtyId,
        request: UpdateSpecialtyRequest,
    ) -> Result<Specialty, AppError> {
        self.store
            .update_specialty(
                id,
                SpecialtyUpdate {
                    name: request.name,
                    description: request.description,
                },
            )
            .await
    }

    pub async fn delete_specialty(&self, id: SpecialtyId) -> Result<(), AppError> {
        self.store.delete_specialty(id).await
    }

    // ----- assignments ------------------------------------------------------

    pub async fn assign_specialty(
        &self,
        doctor_id: DoctorId,
        specialty_id: SpecialtyId,
    ) -> Result<(), AppError> {
        self.store.assign_specialty(doctor_id, specialty_id).await
    }

    pub async fn unassign_specialty(
        &self,
        doctor_id: DoctorId,
        specialty_id: SpecialtyId,
    ) -> Result<(), AppError> {
        self.store.unassign_specialty(doctor_id, specialty_id).await
    }

    pub async fn assign_clinic(
        &self,
        doctor_id: DoctorId,
        clinic_id: ClinicId,
    ) -> Result<(), AppError> {
        self.store.assign_clinic(doctor_id, clinic_id).await
    }

    pub async fn unassign_clinic(
        &self,
        doctor_id: DoctorId,
        clinic_id: ClinicId,
    ) -> Result<(), AppError> {
        self.store.unassign_clinic(doctor_id, clinic_id).await
    }

    pub async fn doctor_specialties(&self, doctor_id: DoctorId) -> Result<Vec<Specialty>, AppError> {
        self.store.doctor_specialties(doctor_id).await
    }

    pub async fn doctor_clinics(&self, doctor_id: DoctorId) -> Result<Vec<Clinic>, AppError> {
        self.store.doctor_clinics(doctor_id).await
    }
}
