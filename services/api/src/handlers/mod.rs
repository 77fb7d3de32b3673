use serde::Serialize;

pub mod albaran;
pub mod client;
pub mod company;
pub mod project;
pub mod user;

/// Acknowledgement body for soft deletes and other side-effect-only calls.
#[derive(Serialize)]
pub struct AckResponse {
    pub success: bool,
    pub message: &'static str,
}

impl AckResponse {
    pub fn ok(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}
