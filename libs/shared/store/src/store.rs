use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDate, NaiveTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use shared_models::{
    AppError, Appointment, AppointmentId, AppointmentStatus, Clinic, ClinicId, Doctor, DoctorId,
    Gender, MedicalRecord, MedicalRecordId, Patient, PatientId, Specialty, SpecialtyId,
    UpcomingAppointment,
};

/// Policy for the slot uniqueness constraint. The constraint on
/// (doctor, date, time) is unconditional, so Cancelled/No-Show rows
/// keep their slot unless `release_cancelled_slots` is set.
#[derive(Debug, Clone, Copy, Default)]
pub struct BookingPolicy {
    pub release_cancelled_slots: bool,
}

#[derive(Debug, Clone)]
pub struct NewPatient {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct PatientUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    pub email: Option<Option<String>>,
    pub address: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub bio: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct DoctorUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub bio: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewClinic {
    pub name: String,
    pub address: String,
    pub phone: String,
}

#[derive(Debug, Clone, Default)]
pub struct ClinicUpdate {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewSpecialty {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct SpecialtyUpdate {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: PatientId,
    pub doctor_id: DoctorId,
    pub clinic_id: ClinicId,
    pub appointment_date: NaiveDate,
    pub appointment_time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AppointmentUpdate {
    pub patient_id: Option<PatientId>,
    pub doctor_id: Option<DoctorId>,
    pub clinic_id: Option<ClinicId>,
    pub appointment_date: Option<NaiveDate>,
    pub appointment_time: Option<NaiveTime>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<Option<String>>,
}

#[derive(Debug, Default)]
struct Sequences {
    patients: i64,
    doctors: i64,
    clinics: i64,
    specialties: i64,
    appointments: i64,
    medical_records: i64,
}

impl Sequences {
    fn next(counter: &mut i64) -> i64 {
        *counter += 1;
        *counter
    }
}

/// All tables live behind one lock so that every multi-row effect
/// (cascade delete, timestamp refresh, check-then-insert) is atomic.
#[derive(Debug, Default)]
struct Tables {
    patients: BTreeMap<PatientId, Patient>,
    doctors: BTreeMap<DoctorId, Doctor>,
    clinics: BTreeMap<ClinicId, Clinic>,
    specialties: BTreeMap<SpecialtyId, Specialty>,
    appointments: BTreeMap<AppointmentId, Appointment>,
    medical_records: BTreeMap<MedicalRecordId, MedicalRecord>,
    doctor_specialties: BTreeSet<(DoctorId, SpecialtyId)>,
    doctor_clinics: BTreeSet<(DoctorId, ClinicId)>,
    // Read-only association indexes, maintained by the store itself.
    appointments_by_doctor: BTreeMap<DoctorId, BTreeSet<AppointmentId>>,
    appointments_by_patient: BTreeMap<PatientId, BTreeSet<AppointmentId>>,
    record_by_appointment: BTreeMap<AppointmentId, MedicalRecordId>,
    seq: Sequences,
}

impl Tables {
    fn slot_conflicts(
        &self,
        policy: &BookingPolicy,
        doctor_id: DoctorId,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<AppointmentId>,
    ) -> usize {
        let Some(ids) = self.appointments_by_doctor.get(&doctor_id) else {
            return 0;
        };
        ids.iter()
            .filter_map(|id| self.appointments.get(id))
            .filter(|apt| Some(apt.id) != exclude)
            .filter(|apt| apt.appointment_date == date && apt.appointment_time == time)
            .filter(|apt| {
                if policy.release_cancelled_slots {
                    !matches!(
                        apt.status,
                        AppointmentStatus::Cancelled | AppointmentStatus::NoShow
                    )
                } else {
                    true
                }
            })
            .count()
    }

    fn remove_appointment_row(&mut self, appointment_id: AppointmentId) {
        if let Some(apt) = self.appointments.remove(&appointment_id) {
            if let Some(ids) = self.appointments_by_doctor.get_mut(&apt.doctor_id) {
                ids.remove(&appointment_id);
            }
            if let Some(ids) = self.appointments_by_patient.get_mut(&apt.patient_id) {
                ids.remove(&appointment_id);
            }
            if let Some(record_id) = self.record_by_appointment.remove(&appointment_id) {
                self.medical_records.remove(&record_id);
                debug!(
                    "Cascade removed medical record {} of appointment {}",
                    record_id, appointment_id
                );
            }
        }
    }

    fn index_appointment(&mut self, apt: &Appointment) {
        self.appointments_by_doctor
            .entry(apt.doctor_id)
            .or_default()
            .insert(apt.id);
        self.appointments_by_patient
            .entry(apt.patient_id)
            .or_default()
            .insert(apt.id);
    }
}

/// Referentially consistent in-memory storage for the clinic entity
/// graph. Constructed once at startup and shared via `Arc`; the write
/// guard on the table set is the sole concurrency-control mechanism,
/// the slot uniqueness check doubling as the booking constraint.
#[derive(Debug, Default)]
pub struct ClinicStore {
    tables: RwLock<Tables>,
    policy: BookingPolicy,
}

impl ClinicStore {
    pub fn new(policy: BookingPolicy) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            policy,
        }
    }

    pub fn policy(&self) -> BookingPolicy {
        self.policy
    }

    // ----- patients ---------------------------------------------------------

    pub async fn create_patient(&self, new: NewPatient) -> Result<Patient, AppError> {
        let mut tables = self.tables.write().await;

        if tables.patients.values().any(|p| p.phone == new.phone) {
            return Err(AppError::Conflict(format!(
                "patient phone {} already registered",
                new.phone
            )));
        }
        if let Some(email) = &new.email {
            if tables
                .patients
                .values()
                .any(|p| p.email.as_deref() == Some(email.as_str()))
            {
                return Err(AppError::Conflict(format!(
                    "patient email {} already registered",
                    email
                )));
            }
        }

        let now = Utc::now();
        let id = Sequences::next(&mut tables.seq.patients);
        let patient = Patient {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            date_of_birth: new.date_of_birth,
            gender: new.gender,
            phone: new.phone,
            email: new.email,
            address: new.address,
            created_at: now,
            last_updated: now,
        };
        tables.patients.insert(id, patient.clone());
        debug!("Created patient {}", id);
        Ok(patient)
    }

    pub async fn get_patient(&self, id: PatientId) -> Result<Patient, AppError> {
        let tables = self.tables.read().await;
        tables
            .patients
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("patient {} not found", id)))
    }

    pub async fn list_patients(&self, offset: usize, limit: usize) -> Vec<Patient> {
        let tables = self.tables.read().await;
        tables
            .patients
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn update_patient(
        &self,
        id: PatientId,
        update: PatientUpdate,
    ) -> Result<Patient, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.patients.contains_key(&id) {
            return Err(AppError::NotFound(format!("patient {} not found", id)));
        }
        if let Some(phone) = &update.phone {
            if tables
                .patients
                .values()
                .any(|p| p.id != id && p.phone == *phone)
            {
                return Err(AppError::Conflict(format!(
                    "patient phone {} already registered",
                    phone
                )));
            }
        }
        if let Some(Some(email)) = &update.email {
            if tables
                .patients
                .values()
                .any(|p| p.id != id && p.email.as_deref() == Some(email.as_str()))
            {
                return Err(AppError::Conflict(format!(
                    "patient email {} already registered",
                    email
                )));
            }
        }

        let Some(patient) = tables.patients.get_mut(&id) else {
            return Err(AppError::NotFound(format!("patient {} not found", id)));
        };
        if let Some(v) = update.first_name {
            patient.first_name = v;
        }
        if let Some(v) = update.last_name {
            patient.last_name = v;
        }
        if let Some(v) = update.date_of_birth {
            patient.date_of_birth = v;
        }
        if let Some(v) = update.gender {
            patient.gender = v;
        }
        if let Some(v) = update.phone {
            patient.phone = v;
        }
        if let Some(v) = update.email {
            patient.email = v;
        }
        if let Some(v) = update.address {
            patient.address = v;
        }
        patient.last_updated = Utc::now();
        Ok(patient.clone())
    }

    pub async fn delete_patient(&self, id: PatientId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.patients.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("patient {} not found", id)));
        }

        let dependents: Vec<AppointmentId> = tables
            .appointments_by_patient
            .remove(&id)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        for appointment_id in &dependents {
            tables.remove_appointment_row(*appointment_id);
        }
        debug!(
            "Deleted patient {} and cascaded {} appointments",
            id,
            dependents.len()
        );
        Ok(())
    }

    // ----- doctors ----------------------------------------------------------

    pub async fn create_doctor(&self, new: NewDoctor) -> Result<Doctor, AppError> {
        let mut tables = self.tables.write().await;

        if tables.doctors.values().any(|d| d.phone == new.phone) {
            return Err(AppError::Conflict(format!(
                "doctor phone {} already registered",
                new.phone
            )));
        }
        if tables.doctors.values().any(|d| d.email == new.email) {
            return Err(AppError::Conflict(format!(
                "doctor email {} already registered",
                new.email
            )));
        }

        let now = Utc::now();
        let id = Sequences::next(&mut tables.seq.doctors);
        let doctor = Doctor {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            phone: new.phone,
            email: new.email,
            bio: new.bio,
            created_at: now,
            last_updated: now,
        };
        tables.doctors.insert(id, doctor.clone());
        debug!("Created doctor {}", id);
        Ok(doctor)
    }

    pub async fn get_doctor(&self, id: DoctorId) -> Result<Doctor, AppError> {
        let tables = self.tables.read().await;
        tables
            .doctors
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("doctor {} not found", id)))
    }

    pub async fn list_doctors(&self, offset: usize, limit: usize) -> Vec<Doctor> {
        let tables = self.tables.read().await;
        tables
            .doctors
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn update_doctor(
        &self,
        id: DoctorId,
        update: DoctorUpdate,
    ) -> Result<Doctor, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.doctors.contains_key(&id) {
            return Err(AppError::NotFound(format!("doctor {} not found", id)));
        }
        if let Some(phone) = &update.phone {
            if tables
                .doctors
                .values()
                .any(|d| d.id != id && d.phone == *phone)
            {
                return Err(AppError::Conflict(format!(
                    "doctor phone {} already registered",
                    phone
                )));
            }
        }
        if let Some(email) = &update.email {
            if tables
                .doctors
                .values()
                .any(|d| d.id != id && d.email == *email)
            {
                return Err(AppError::Conflict(format!(
                    "doctor email {} already registered",
                    email
                )));
            }
        }

        let Some(doctor) = tables.doctors.get_mut(&id) else {
            return Err(AppError::NotFound(format!("doctor {} not found", id)));
        };
        if let Some(v) = update.first_name {
            doctor.first_name = v;
        }
        if let Some(v) = update.last_name {
            doctor.last_name = v;
        }
        if let Some(v) = update.phone {
            doctor.phone = v;
        }
        if let Some(v) = update.email {
            doctor.email = v;
        }
        if let Some(v) = update.bio {
            doctor.bio = v;
        }
        doctor.last_updated = Utc::now();
        Ok(doctor.clone())
    }

    pub async fn delete_doctor(&self, id: DoctorId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.doctors.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("doctor {} not found", id)));
        }

        let dependents: Vec<AppointmentId> = tables
            .appointments_by_doctor
            .remove(&id)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        for appointment_id in &dependents {
            tables.remove_appointment_row(*appointment_id);
        }
        tables.doctor_specialties.retain(|(d, _)| *d != id);
        tables.doctor_clinics.retain(|(d, _)| *d != id);
        debug!(
            "Deleted doctor {} and cascaded {} appointments",
            id,
            dependents.len()
        );
        Ok(())
    }

    // ----- clinics ----------------------------------------------------------

    pub async fn create_clinic(&self, new: NewClinic) -> Result<Clinic, AppError> {
        let mut tables = self.tables.write().await;
        let id = Sequences::next(&mut tables.seq.clinics);
        let clinic = Clinic {
            id,
            name: new.name,
            address: new.address,
            phone: new.phone,
        };
        tables.clinics.insert(id, clinic.clone());
        debug!("Created clinic {}", id);
        Ok(clinic)
    }

    pub async fn get_clinic(&self, id: ClinicId) -> Result<Clinic, AppError> {
        let tables = self.tables.read().await;
        tables
            .clinics
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("clinic {} not found", id)))
    }

    pub async fn list_clinics(&self, offset: usize, limit: usize) -> Vec<Clinic> {
        let tables = self.tables.read().await;
        tables
            .clinics
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn update_clinic(
        &self,
        id: ClinicId,
        update: ClinicUpdate,
    ) -> Result<Clinic, AppError> {
        let mut tables = self.tables.write().await;
        let clinic = tables
            .clinics
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound(format!("clinic {} not found", id)))?;
        if let Some(v) = update.name {
            clinic.name = v;
        }
        if let Some(v) = update.address {
            clinic.address = v;
        }
        if let Some(v) = update.phone {
            clinic.phone = v;
        }
        Ok(clinic.clone())
    }

    pub async fn delete_clinic(&self, id: ClinicId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.clinics.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("clinic {} not found", id)));
        }

        let dependents: Vec<AppointmentId> = tables
            .appointments
            .values()
            .filter(|apt| apt.clinic_id == id)
            .map(|apt| apt.id)
            .collect();
        for appointment_id in &dependents {
            tables.remove_appointment_row(*appointment_id);
        }
        tables.doctor_clinics.retain(|(_, c)| *c != id);
        debug!(
            "Deleted clinic {} and cascaded {} appointments",
            id,
            dependents.len()
        );
        Ok(())
    }

    // ----- specialties ------------------------------------------------------

    pub async fn create_specialty(&self, new: NewSpecialty) -> Result<Specialty, AppError> {
        let mut tables = self.tables.write().await;

        if tables.specialties.values().any(|s| s.name == new.name) {
            return Err(AppError::Conflict(format!(
                "specialty {} already exists",
                new.name
            )));
        }

        let id = Sequences::next(&mut tables.seq.specialties);
        let specialty = Specialty {
            id,
            name: new.name,
            description: new.description,
        };
        tables.specialties.insert(id, specialty.clone());
        debug!("Created specialty {}", id);
        Ok(specialty)
    }

    pub async fn get_specialty(&self, id: SpecialtyId) -> Result<Specialty, AppError> {
        let tables = self.tables.read().await;
        tables
            .specialties
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("specialty {} not found", id)))
    }

    pub async fn list_specialties(&self, offset: usize, limit: usize) -> Vec<Specialty> {
        let tables = self.tables.read().await;
        tables
            .specialties
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn update_specialty(
        &self,
        id: SpecialtyId,
        update: SpecialtyUpdate,
    ) -> Result<Specialty, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.specialties.contains_key(&id) {
            return Err(AppError::NotFound(format!("specialty {} not found", id)));
        }
        if let Some(name) = &update.name {
            if tables
                .specialties
                .values()
                .any(|s| s.id != id && s.name == *name)
            {
                return Err(AppError::Conflict(format!(
                    "specialty {} already exists",
                    name
                )));
            }
        }

        let Some(specialty) = tables.specialties.get_mut(&id) else {
            return Err(AppError::NotFound(format!("specialty {} not found", id)));
        };
        if let Some(v) = update.name {
            specialty.name = v;
        }
        if let Some(v) = update.description {
            specialty.description = v;
        }
        Ok(specialty.clone())
    }

    pub async fn delete_specialty(&self, id: SpecialtyId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if tables.specialties.remove(&id).is_none() {
            return Err(AppError::NotFound(format!("specialty {} not found", id)));
        }
        tables.doctor_specialties.retain(|(_, s)| *s != id);
        Ok(())
    }

    // ----- doctor relations -------------------------------------------------

    pub async fn assign_specialty(
        &self,
        doctor_id: DoctorId,
        specialty_id: SpecialtyId,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                doctor_id
            )));
        }
        if !tables.specialties.contains_key(&specialty_id) {
            return Err(AppError::NotFound(format!(
                "specialty {} not found",
                specialty_id
            )));
        }
        if !tables.doctor_specialties.insert((doctor_id, specialty_id)) {
            return Err(AppError::Conflict(format!(
                "doctor {} already has specialty {}",
                doctor_id, specialty_id
            )));
        }
        Ok(())
    }

    pub async fn unassign_specialty(
        &self,
        doctor_id: DoctorId,
        specialty_id: SpecialtyId,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.doctor_specialties.remove(&(doctor_id, specialty_id)) {
            return Err(AppError::NotFound(format!(
                "doctor {} has no specialty {}",
                doctor_id, specialty_id
            )));
        }
        Ok(())
    }

    pub async fn assign_clinic(
        &self,
        doctor_id: DoctorId,
        clinic_id: ClinicId,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.doctors.contains_key(&doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                doctor_id
            )));
        }
        if !tables.clinics.contains_key(&clinic_id) {
            return Err(AppError::NotFound(format!(
                "clinic {} not found",
                clinic_id
            )));
        }
        if !tables.doctor_clinics.insert((doctor_id, clinic_id)) {
            return Err(AppError::Conflict(format!(
                "doctor {} already practices at clinic {}",
                doctor_id, clinic_id
            )));
        }
        Ok(())
    }

    pub async fn unassign_clinic(
        &self,
        doctor_id: DoctorId,
        clinic_id: ClinicId,
    ) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.doctor_clinics.remove(&(doctor_id, clinic_id)) {
            return Err(AppError::NotFound(format!(
                "doctor {} does not practice at clinic {}",
                doctor_id, clinic_id
            )));
        }
        Ok(())
    }

    pub async fn doctor_specialties(&self, doctor_id: DoctorId) -> Result<Vec<Specialty>, AppError> {
        let tables = self.tables.read().await;
        if !tables.doctors.contains_key(&doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                doctor_id
            )));
        }
        Ok(tables
            .doctor_specialties
            .iter()
            .filter(|(d, _)| *d == doctor_id)
            .filter_map(|(_, s)| tables.specialties.get(s))
            .cloned()
            .collect())
    }

    pub async fn doctor_clinics(&self, doctor_id: DoctorId) -> Result<Vec<Clinic>, AppError> {
        let tables = self.tables.read().await;
        if !tables.doctors.contains_key(&doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                doctor_id
            )));
        }
        Ok(tables
            .doctor_clinics
            .iter()
            .filter(|(d, _)| *d == doctor_id)
            .filter_map(|(_, c)| tables.clinics.get(c))
            .cloned()
            .collect())
    }

    // ----- appointments -----------------------------------------------------

    /// Advisory conflict count for a candidate slot. The authoritative
    /// check re-runs under the write guard in `create_appointment` /
    /// `update_appointment`, so a race lost between this call and the
    /// insert still ends in a Conflict, never a double booking.
    pub async fn slot_conflicts(
        &self,
        doctor_id: DoctorId,
        date: NaiveDate,
        time: NaiveTime,
        exclude: Option<AppointmentId>,
    ) -> usize {
        let tables = self.tables.read().await;
        tables.slot_conflicts(&self.policy, doctor_id, date, time, exclude)
    }

    pub async fn create_appointment(&self, new: NewAppointment) -> Result<Appointment, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.patients.contains_key(&new.patient_id) {
            return Err(AppError::NotFound(format!(
                "patient {} not found",
                new.patient_id
            )));
        }
        if !tables.doctors.contains_key(&new.doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                new.doctor_id
            )));
        }
        if !tables.clinics.contains_key(&new.clinic_id) {
            return Err(AppError::NotFound(format!(
                "clinic {} not found",
                new.clinic_id
            )));
        }

        if tables.slot_conflicts(
            &self.policy,
            new.doctor_id,
            new.appointment_date,
            new.appointment_time,
            None,
        ) > 0
        {
            warn!(
                "Rejected booking: doctor {} already booked at {} {}",
                new.doctor_id, new.appointment_date, new.appointment_time
            );
            return Err(AppError::Conflict(format!(
                "doctor {} already booked at {} {}",
                new.doctor_id, new.appointment_date, new.appointment_time
            )));
        }

        let id = Sequences::next(&mut tables.seq.appointments);
        let appointment = Appointment {
            id,
            patient_id: new.patient_id,
            doctor_id: new.doctor_id,
            clinic_id: new.clinic_id,
            appointment_date: new.appointment_date,
            appointment_time: new.appointment_time,
            status: AppointmentStatus::Scheduled,
            notes: new.notes,
            created_at: Utc::now(),
        };
        tables.appointments.insert(id, appointment.clone());
        tables.index_appointment(&appointment);
        debug!(
            "Created appointment {} for doctor {} at {} {}",
            id, appointment.doctor_id, appointment.appointment_date, appointment.appointment_time
        );
        Ok(appointment)
    }

    pub async fn get_appointment(&self, id: AppointmentId) -> Result<Appointment, AppError> {
        let tables = self.tables.read().await;
        tables
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("appointment {} not found", id)))
    }

    pub async fn list_appointments(&self, offset: usize, limit: usize) -> Vec<Appointment> {
        let tables = self.tables.read().await;
        tables
            .appointments
            .values()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect()
    }

    /// An update that moves the slot tuple (doctor, date, time) is a
    /// new booking attempt and is re-validated against the constraint,
    /// excluding the row being updated.
    pub async fn update_appointment(
        &self,
        id: AppointmentId,
        update: AppointmentUpdate,
    ) -> Result<Appointment, AppError> {
        let mut tables = self.tables.write().await;

        let current = tables
            .appointments
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("appointment {} not found", id)))?;

        let patient_id = update.patient_id.unwrap_or(current.patient_id);
        let doctor_id = update.doctor_id.unwrap_or(current.doctor_id);
        let clinic_id = update.clinic_id.unwrap_or(current.clinic_id);
        let date = update.appointment_date.unwrap_or(current.appointment_date);
        let time = update.appointment_time.unwrap_or(current.appointment_time);

        if !tables.patients.contains_key(&patient_id) {
            return Err(AppError::NotFound(format!(
                "patient {} not found",
                patient_id
            )));
        }
        if !tables.doctors.contains_key(&doctor_id) {
            return Err(AppError::NotFound(format!(
                "doctor {} not found",
                doctor_id
            )));
        }
        if !tables.clinics.contains_key(&clinic_id) {
            return Err(AppError::NotFound(format!(
                "clinic {} not found",
                clinic_id
            )));
        }

        let slot_moved = doctor_id != current.doctor_id
            || date != current.appointment_date
            || time != current.appointment_time;
        if slot_moved
            && tables.slot_conflicts(&self.policy, doctor_id, date, time, Some(id)) > 0
        {
            warn!(
                "Rejected reschedule of appointment {}: doctor {} already booked at {} {}",
                id, doctor_id, date, time
            );
            return Err(AppError::Conflict(format!(
                "doctor {} already booked at {} {}",
                doctor_id, date, time
            )));
        }

        // Re-index before replacing the row if either side of an
        // association changed.
        if doctor_id != current.doctor_id || patient_id != current.patient_id {
            if let Some(ids) = tables.appointments_by_doctor.get_mut(&current.doctor_id) {
                ids.remove(&id);
            }
            if let Some(ids) = tables.appointments_by_patient.get_mut(&current.patient_id) {
                ids.remove(&id);
            }
        }

        let Some(appointment) = tables.appointments.get_mut(&id) else {
            return Err(AppError::NotFound(format!("appointment {} not found", id)));
        };
        appointment.patient_id = patient_id;
        appointment.doctor_id = doctor_id;
        appointment.clinic_id = clinic_id;
        appointment.appointment_date = date;
        appointment.appointment_time = time;
        if let Some(status) = update.status {
            appointment.status = status;
        }
        if let Some(notes) = update.notes {
            appointment.notes = notes;
        }
        let updated = appointment.clone();

        if doctor_id != current.doctor_id || patient_id != current.patient_id {
            tables.index_appointment(&updated);
        }
        Ok(updated)
    }

    pub async fn delete_appointment(&self, id: AppointmentId) -> Result<(), AppError> {
        let mut tables = self.tables.write().await;
        if !tables.appointments.contains_key(&id) {
            return Err(AppError::NotFound(format!("appointment {} not found", id)));
        }
        tables.remove_appointment_row(id);
        debug!("Deleted appointment {}", id);
        Ok(())
    }

    // ----- medical records --------------------------------------------------

    pub async fn attach_medical_record(
        &self,
        appointment_id: AppointmentId,
        diagnosis: String,
        prescription: String,
        follow_up_date: Option<NaiveDate>,
    ) -> Result<MedicalRecord, AppError> {
        let mut tables = self.tables.write().await;

        if !tables.appointments.contains_key(&appointment_id) {
            return Err(AppError::NotFound(format!(
                "appointment {} not found",
                appointment_id
            )));
        }
        if tables.record_by_appointment.contains_key(&appointment_id) {
            return Err(AppError::Conflict(format!(
                "appointment {} already has a medical record",
                appointment_id
            )));
        }

        let id = Sequences::next(&mut tables.seq.medical_records);
        let record = MedicalRecord {
            id,
            appointment_id,
            diagnosis,
            prescription,
            follow_up_date,
        };
        tables.medical_records.insert(id, record.clone());
        tables.record_by_appointment.insert(appointment_id, id);
        debug!(
            "Attached medical record {} to appointment {}",
            id, appointment_id
        );
        Ok(record)
    }

    pub async fn medical_record_for(
        &self,
        appointment_id: AppointmentId,
    ) -> Result<MedicalRecord, AppError> {
        let tables = self.tables.read().await;
        if !tables.appointments.contains_key(&appointment_id) {
            return Err(AppError::NotFound(format!(
                "appointment {} not found",
                appointment_id
            )));
        }
        tables
            .record_by_appointment
            .get(&appointment_id)
            .and_then(|record_id| tables.medical_records.get(record_id))
            .cloned()
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "appointment {} has no medical record",
                    appointment_id
                ))
            })
    }

    // ----- views ------------------------------------------------------------

    /// Read-only join of future Scheduled appointments with their
    /// patient, doctor and clinic, ordered by slot.
    pub async fn upcoming_appointments(
        &self,
        today: NaiveDate,
        now: NaiveTime,
    ) -> Vec<UpcomingAppointment> {
        let tables = self.tables.read().await;
        let mut rows: Vec<UpcomingAppointment> = tables
            .appointments
            .values()
            .filter(|apt| apt.status == AppointmentStatus::Scheduled)
            .filter(|apt| {
                apt.appointment_date > today
                    || (apt.appointment_date == today && apt.appointment_time > now)
            })
            .filter_map(|apt| {
                let patient = tables.patients.get(&apt.patient_id)?;
                let doctor = tables.doctors.get(&apt.doctor_id)?;
                let clinic = tables.clinics.get(&apt.clinic_id)?;
                Some(UpcomingAppointment {
                    appointment_id: apt.id,
                    appointment_date: apt.appointment_date,
                    appointment_time: apt.appointment_time,
                    patient_id: patient.id,
                    patient_name: patient.full_name(),
                    doctor_id: doctor.id,
                    doctor_name: doctor.full_name(),
                    clinic_id: clinic.id,
                    clinic_name: clinic.name.clone(),
                })
            })
            .collect();
        rows.sort_by_key(|row| (row.appointment_date, row.appointment_time));
        rows
    }
}
