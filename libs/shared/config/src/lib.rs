use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Whether Cancelled/No-Show appointments free their slot for
    /// rebooking. The unique constraint on (doctor, date, time) is
    /// unconditional, so the default is false.
    pub release_cancelled_slots: bool,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| {
            warn!("BIND_ADDR not set, using default");
            "0.0.0.0:3000".to_string()
        });

        let release_cancelled_slots = match env::var("RELEASE_CANCELLED_SLOTS") {
            Ok(value) => match value.to_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" => false,
                other => {
                    warn!("RELEASE_CANCELLED_SLOTS has unrecognized value {:?}, using false", other);
                    false
                }
            },
            Err(_) => false,
        };

        Self {
            bind_addr,
            release_cancelled_slots,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            release_cancelled_slots: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_keeps_cancelled_slots_occupied() {
        let config = AppConfig::default();
        assert!(!config.release_cancelled_slots);
    }
}
