use std::sync::Arc;

use tracing::{debug, info};

use shared_models::validate::parse_date;
use shared_models::{AppError, Patient, PatientId};
use shared_store::{ClinicStore, NewPatient, PatientUpdate};

use crate::models::{CreatePatientRequest, UpdatePatientRequest};

pub struct PatientService {
    store: Arc<ClinicStore>,
}

impl PatientService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, AppError> {
        let date_of_birth = parse_date("date_of_birth", &request.date_of_birth)?;

        let patient = self
            .store
            .create_patient(NewPatient {
                first_name: request.first_name,
                last_name: request.last_name,
                date_of_birth,
                gender: request.gender,
                phone: request.phone,
                email: request.email,
                address: request.address,
            })
            .await?;

        info!("Registered patient {}", patient.id);
        Ok(patient)
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient, AppError> {
        self.store.get_patient(id).await
    }

    pub async fn list_patients(&self, offset: usize, limit: usize) -> Vec<Patient> {
        self.store.list_patients(offset, limit).await
    }

    pub async fn update_patient(
        &self,
        id: PatientId,
        request: UpdatePatientRequest,
    ) -> Result<Patient, AppError> {
        let date_of_birth = request
            .date_of_birth
            .as_deref()
            .map(|value| parse_date("date_of_birth", value))
            .transpose()?;

        let patient = self
            .store
            .update_patient(
                id,
                PatientUpdate {
                    first_name: request.first_name,
                    last_name: request.last_name,
                    date_of_birth,
                    gender: request.gender,
                    phone: request.phone,
                    email: request.email,
                    address: request.address,
                },
            )
            .await?;

        debug!("Updated patient {}", id);
        Ok(patient)
    }

    /// Cascades to the patient's appointments and their medical records.
    pub async fn delete_patient(&self, id: PatientId) -> Result<(), AppError> {
        self.store.delete_patient(id).await?;
        info!("Deleted patient {}", id);
        Ok(())
    }
}
