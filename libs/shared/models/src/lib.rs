pub mod entities;
pub mod error;
pub mod patch;
pub mod validate;

pub use entities::*;
pub use error::AppError;
