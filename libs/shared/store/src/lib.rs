pub mod store;

pub use store::{
    AppointmentUpdate, BookingPolicy, ClinicStore, ClinicUpdate, DoctorUpdate, NewAppointment,
    NewClinic, NewDoctor, NewPatient, NewSpecialty, PatientUpdate,
    SpecialtyUpdate,
};
