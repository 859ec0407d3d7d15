use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Utc};
use tracing::{debug, info};

use shared_models::validate::{parse_date, parse_time};
use shared_models::{AppError, Appointment, AppointmentId, DoctorId, UpcomingAppointment};
use shared_store::{AppointmentUpdate, ClinicStore, NewAppointment};

use crate::models::{BookAppointmentRequest, SlotDecision, UpdateAppointmentRequest};

/// Books appointments through the slot-conflict validator. The
/// advisory `validate_slot` is exposed for callers that want a
/// pre-flight answer; `book_appointment` relies on the store to rerun
/// the check atomically with the insert, so two racing bookings for
/// the same slot serialize and exactly one wins.
pub struct BookingService {
    store: Arc<ClinicStore>,
}

impl BookingService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }

    pub async fn validate_slot(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        time: NaiveTime,
    ) -> SlotDecision {
        let conflicts = self.store.slot_conflicts(doctor_id, date, time, None).await;
        if conflicts > 0 {
            debug!(
                "Slot check: doctor {} at {} {} already booked",
                doctor_id, date, time
            );
            SlotDecision::Reject {
                reason: format!("doctor {} already booked at {} {}", doctor_id, date, time),
            }
        } else {
            SlotDecision::Admit
        }
    }

    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let date = parse_date("appointment_date", &request.appointment_date)?;
        let time = parse_time("appointment_time", &request.appointment_time)?;

        info!(
            "Booking appointment for patient {} with doctor {} at {} {}",
            request.patient_id, request.doctor_id, date, time
        );

        // The store repeats the conflict check under its write guard;
        // a lost race still surfaces as Conflict, never a double booking.
        let appointment = self
            .store
            .create_appointment(NewAppointment {
                patient_id: request.patient_id,
                doctor_id: request.doctor_id,
                clinic_id: request.clinic_id,
                appointment_date: date,
                appointment_time: time,
                notes: request.notes,
            })
            .await?;

        info!("Appointment {} booked", appointment.id);
        Ok(appointment)
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        self.store.get_appointment(id).await
    }

    pub async fn list_appointments(&self, offset: usize, limit: usize) -> Vec<Appointment> {
        self.store.list_appointments(offset, limit).await
    }

    /// A change to any of (doctor, date, time) is treated as a fresh
    /// booking attempt and re-validated by the store.
    pub async fn update_appointment(
        &self,
        id: AppointmentId,
        request: UpdateAppointmentRequest,
    ) -> Result<Appointment, AppError> {
        let date = request
            .appointment_date
            .as_deref()
            .map(|value| parse_date("appointment_date", value))
            .transpose()?;
        let time = request
            .appointment_time
            .as_deref()
            .map(|value| parse_time("appointment_time", value))
            .transpose()?;

        if request.doctor_id.is_some() || date.is_some() || time.is_some() {
            debug!("Appointment {} update moves its slot, re-validating", id);
        }

        self.store
            .update_appointment(
                id,
                AppointmentUpdate {
                    patient_id: request.patient_id,
                    doctor_id: request.doctor_id,
                    clinic_id: request.clinic_id,
                    appointment_date: date,
                    appointment_time: time,
                    status: request.status,
                    notes: request.notes,
                },
            )
            .await
    }

    /// Cascades to the appointment's medical record, if any.
    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<(), AppError> {
        self.store.delete_appointment(id).await?;
        info!("Deleted appointment {}", id);
        Ok(())
    }

    pub async fn upcoming_appointments(&self) -> Vec<UpcomingAppointment> {
        let now = Utc::now().naive_utc();
        self.store
            .upcoming_appointments(now.date(), now.time())
            .await
    }
}
