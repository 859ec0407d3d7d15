mod booking;
mod lifecycle;

pub use booking::BookingService;
pub use lifecycle::LifecycleService;
