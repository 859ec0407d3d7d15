use std::sync::Arc;

use tracing::{debug, info, warn};

use shared_models::validate::parse_date;
use shared_models::{AppError, Appointment, AppointmentId, AppointmentStatus, MedicalRecord};
use shared_store::{AppointmentUpdate, ClinicStore};

use crate::models::AttachMedicalRecordRequest;

/// Owns the appointment state machine and the medical-record
/// attachment. No restriction is placed on the transition graph, so
/// every explicit transition is applied; ones that would surprise a
/// stricter design are logged instead of refused.
pub struct LifecycleService {
    store: Arc<ClinicStore>,
}

impl LifecycleService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    /// Status changes in place; the row is never dropped on
    /// cancellation and, under the default policy, keeps its slot.
    pub async fn set_status(
        &self,
        id: AppointmentId,
        new_status: AppointmentStatus,
    ) -> Result<Appointment, AppError> {
        let current = self.store.get_appointment(id).await?;

        if current.status.is_terminal() && new_status != current.status {
            warn!(
                "Appointment {} leaves terminal status {} for {}",
                id, current.status, new_status
            );
        }
        debug!(
            "Appointment {} status {} -> {}",
            id, current.status, new_status
        );

        self.store
            .update_appointment(
                id,
                AppointmentUpdate {
                    status: Some(new_status),
                    ..AppointmentUpdate::default()
                },
            )
            .await
    }

    /// Requires only that the appointment exists; attaching before
    /// completion is an unenforced expectation and is logged.
    pub async fn attach_medical_record(
        &self,
        appointment_id: AppointmentId,
        request: AttachMedicalRecordRequest,
    ) -> Result<MedicalRecord, AppError> {
        let follow_up_date = request
            .follow_up_date
            .as_deref()
            .map(|value| parse_date("follow_up_date", value))
            .transpose()?;

        let appointment = self.store.get_appointment(appointment_id).await?;
        if appointment.status != AppointmentStatus::Completed {
            warn!(
                "Attaching medical record to appointment {} in status {}",
                appointment_id, appointment.status
            );
        }

        let record = self
            .store
            .attach_medical_record(
                appointment_id,
                request.diagnosis,
                request.prescription,
                follow_up_date,
            )
            .await?;

        info!(
            "Medical record {} attached to appointment {}",
            record.id, appointment_id
        );
        Ok(record)
    }

    pub async fn medical_record(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<MedicalRecord, AppError> {
        self.store.medical_record_for(appointment_id).await
    }
}
