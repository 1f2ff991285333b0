mod admin;
pub mod dto;
pub mod response;
mod router;
mod staff;
mod user;

pub use router::{AppState, create_router};
