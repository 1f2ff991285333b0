//! Resource services. Every call takes the requesting [`Principal`] explicitly
//! and returns a [`ServiceError`] that the HTTP layer maps onto a status code.
//!
//! [`Principal`]: crate::types::Principal

mod appointments;
mod pets;
mod schedule;
mod users;
mod validation;

use std::fmt;

use thiserror::Error;

use crate::auth::{ForbiddenError, OwnershipError};

pub use appointments::{AppointmentPatch, AppointmentService, NewAppointment};
pub use pets::{NewPet, PetPatch, PetService};
pub use schedule::{BusinessHours, SlotTime, SlotViolation};
pub use users::{AccountDetails, LoginRequest, NewAccount, UserPatch, UserService};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    User,
    Pet,
    Appointment,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceKind::User => "user",
            ResourceKind::Pet => "pet",
            ResourceKind::Appointment => "appointment",
        })
    }
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{kind} {id} not found")]
    NotFound { kind: ResourceKind, id: i64 },

    #[error(transparent)]
    Forbidden(#[from] ForbiddenError),

    #[error(transparent)]
    NotOwned(#[from] OwnershipError),

    #[error("slot already booked by appointment {appointment_id}")]
    SlotConflict { appointment_id: i64 },

    #[error("invalid appointment slot: {0}")]
    InvalidSlot(#[from] SlotViolation),

    #[error("{0}")]
    InvalidInput(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("internal error: {0}")]
    Internal(#[from] crate::error::Error),
}

impl ServiceError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ServiceError::InvalidInput(message.into())
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
