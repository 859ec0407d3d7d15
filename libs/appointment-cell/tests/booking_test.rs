use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::NaiveDate;

use appointment_cell::models::{
    AttachMedicalRecordRequest, BookAppointmentRequest, SlotDecision, UpdateAppointmentRequest,
};
use appointment_cell::services::{BookingService, LifecycleService};
use shared_models::{AppError, AppointmentStatus, Gender};
use shared_store::{ClinicStore, NewClinic, NewDoctor, NewPatient};

async fn seeded_store() -> (Arc<ClinicStore>, i64, i64, i64) {
    let store = Arc::new(ClinicStore::default());
    let patient = store
        .create_patient(NewPatient {
            first_name: "Ada".to_string(),
            last_name: "Moyo".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 4, 12).unwrap(),
            gender: Gender::Female,
            phone: "555-2001".to_string(),
            email: None,
            address: None,
        })
        .await
        .unwrap();
    let doctor = store
        .create_doctor(NewDoctor {
            first_name: "Grace".to_string(),
            last_name: "Okafor".to_string(),
            phone: "555-3001".to_string(),
            email: "g.okafor@clinic.test".to_string(),
            bio: None,
        })
        .await
        .unwrap();
    let clinic = store
        .create_clinic(NewClinic {
            name: "Central Clinic".to_string(),
            address: "12 Main St".to_string(),
            phone: "555-0100".to_string(),
        })
        .await
        .unwrap();
    (store, patient.id, doctor.id, clinic.id)
}

fn booking_request(patient: i64, doctor: i64, clinic: i64, time: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        patient_id: patient,
        doctor_id: doctor,
        clinic_id: clinic,
        appointment_date: "2025-11-01".to_string(),
        appointment_time: time.to_string(),
        notes: None,
    }
}

#[tokio::test]
async fn validator_admits_then_rejects_the_same_slot() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let service = BookingService::new(store);

    let date = NaiveDate::from_ymd_opt(2025, 11, 1).unwrap();
    let time = chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap();

    assert_eq!(
        service.validate_slot(doctor, date, time).await,
        SlotDecision::Admit
    );

    service
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();

    assert_matches!(
        service.validate_slot(doctor, date, time).await,
        SlotDecision::Reject { .. }
    );
}

#[tokio::test]
async fn exactly_one_of_two_racing_bookings_wins() {
    let (store, patient, doctor, clinic) = seeded_store().await;

    let a = {
        let store = Arc::clone(&store);
        let request = booking_request(patient, doctor, clinic, "10:00:00");
        tokio::spawn(async move { BookingService::new(store).book_appointment(request).await })
    };
    let b = {
        let store = Arc::clone(&store);
        let request = booking_request(patient, doctor, clinic, "10:00:00");
        tokio::spawn(async move { BookingService::new(store).book_appointment(request).await })
    };

    let first = a.await.unwrap();
    let second = b.await.unwrap();

    let wins = [&first, &second].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1, "exactly one racing booking must be admitted");

    let loser = if first.is_ok() { second } else { first };
    assert_matches!(loser, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn malformed_date_is_rejected_before_any_mutation() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let service = BookingService::new(Arc::clone(&store));

    let mut request = booking_request(patient, doctor, clinic, "10:00:00");
    request.appointment_date = "01/11/2025".to_string();
    assert_matches!(
        service.book_appointment(request).await,
        Err(AppError::ValidationError(_))
    );

    let mut request = booking_request(patient, doctor, clinic, "not-a-time");
    request.appointment_time = "not-a-time".to_string();
    assert_matches!(
        service.book_appointment(request).await,
        Err(AppError::ValidationError(_))
    );

    assert!(store.list_appointments(0, 10).await.is_empty());
}

#[tokio::test]
async fn update_that_moves_the_slot_is_revalidated() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let service = BookingService::new(Arc::clone(&store));

    service
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();
    let movable = service
        .book_appointment(booking_request(patient, doctor, clinic, "11:00:00"))
        .await
        .unwrap();

    let result = service
        .update_appointment(
            movable.id,
            UpdateAppointmentRequest {
                appointment_time: Some("10:00:00".to_string()),
                ..UpdateAppointmentRequest::default()
            },
        )
        .await;
    assert_matches!(result, Err(AppError::Conflict(_)));
}

#[tokio::test]
async fn cancellation_keeps_the_row_and_the_slot() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let booking = BookingService::new(Arc::clone(&store));
    let lifecycle = LifecycleService::new(Arc::clone(&store));

    let apt = booking
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();
    assert_eq!(apt.status, AppointmentStatus::Scheduled);

    let cancelled = lifecycle
        .set_status(apt.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);

    // Row survives and the slot stays occupied under the default policy.
    assert!(booking.get_appointment(apt.id).await.is_ok());
    assert_matches!(
        booking
            .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
            .await,
        Err(AppError::Conflict(_))
    );
}

#[tokio::test]
async fn lifecycle_allows_every_explicit_transition() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let booking = BookingService::new(Arc::clone(&store));
    let lifecycle = LifecycleService::new(Arc::clone(&store));

    let apt = booking
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();

    for status in [
        AppointmentStatus::Completed,
        AppointmentStatus::NoShow,
        AppointmentStatus::Scheduled,
        AppointmentStatus::Cancelled,
    ] {
        let updated = lifecycle.set_status(apt.id, status).await.unwrap();
        assert_eq!(updated.status, status);
    }
}

#[tokio::test]
async fn medical_record_requires_an_existing_appointment() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let booking = BookingService::new(Arc::clone(&store));
    let lifecycle = LifecycleService::new(Arc::clone(&store));

    let record_request = AttachMedicalRecordRequest {
        diagnosis: "seasonal flu".to_string(),
        prescription: "rest and fluids".to_string(),
        follow_up_date: Some("2025-11-15".to_string()),
    };

    assert_matches!(
        lifecycle.attach_medical_record(404, record_request.clone()).await,
        Err(AppError::NotFound(_))
    );

    let apt = booking
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();
    lifecycle
        .set_status(apt.id, AppointmentStatus::Completed)
        .await
        .unwrap();

    let record = lifecycle
        .attach_medical_record(apt.id, record_request)
        .await
        .unwrap();
    assert_eq!(record.appointment_id, apt.id);

    let fetched = lifecycle.medical_record(apt.id).await.unwrap();
    assert_eq!(fetched.id, record.id);

    // Deleting the appointment takes the record with it.
    booking.delete_appointment(apt.id).await.unwrap();
    assert_matches!(
        lifecycle.medical_record(apt.id).await,
        Err(AppError::NotFound(_))
    );
}

#[tokio::test]
async fn leaving_a_terminal_state_is_permitted() {
    let (store, patient, doctor, clinic) = seeded_store().await;
    let booking = BookingService::new(Arc::clone(&store));
    let lifecycle = LifecycleService::new(Arc::clone(&store));

    let apt = booking
        .book_appointment(booking_request(patient, doctor, clinic, "10:00:00"))
        .await
        .unwrap();

    // Terminal to terminal and terminal back to Scheduled both apply.
    lifecycle
        .set_status(apt.id, AppointmentStatus::Completed)
        .await
        .unwrap();
    let recancelled = lifecycle
        .set_status(apt.id, AppointmentStatus::Cancelled)
        .await
        .unwrap();
    assert_eq!(recancelled.status, AppointmentStatus::Cancelled);

    let reopened = lifecycle
        .set_status(apt.id, AppointmentStatus::Scheduled)
        .await
        .unwrap();
    assert_eq!(reopened.status, AppointmentStatus::Scheduled);
}
