mod clinic;
mod server;

pub use clinic::{AuthSettings, ClinicConfig, ClinicSettings};
pub use server::ServerConfig;
