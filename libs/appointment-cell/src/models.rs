use serde::{Deserialize, Serialize};

use shared_models::{AppointmentStatus, ClinicId, DoctorId, PatientId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookAppointmentRequest {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub clinic_id: ClinicId,
    /// YYYY-MM-DD
    pub appointment_date: String,
    /// HH:MM:SS
    pub appointment_time: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub clinic_id: Option<ClinicId>,
    pub appointment_date: Option<String>,
    pub appointment_time: Option<String>,
    pub status: Option<AppointmentStatus>,
    // Explicit JSON null clears the notes, absence leaves them unchanged.
    #[serde(default, deserialize_with = "shared_models::patch::double_option")]
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachMedicalRecordRequest {
    pub diagnosis: String,
    pub prescription: String,
    /// YYYY-MM-DD
    pub follow_up_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub offset: usize,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    10
}

/// Outcome of validating a candidate (doctor, date, time) slot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum SlotDecision {
    Admit,
    Reject { reason: String },
}

impl SlotDecision {
    pub fn is_admit(&self) -> bool {
        matches!(self, SlotDecision::Admit)
    }
}
