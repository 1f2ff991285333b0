use thiserror::Error;

use crate::error::Result as StoreResult;
use crate::service::{ResourceKind, ServiceError};
use crate::types::{Pet, Principal, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("requested resource is not owned by the user")]
pub struct OwnershipError;

/// Owners may only touch resources whose effective owner is themselves.
/// Staff and admins always pass.
pub fn check_ownership(effective_owner_id: i64, principal: &Principal) -> Result<(), OwnershipError> {
    if principal.role.bypasses_ownership() || principal.user_id == effective_owner_id {
        Ok(())
    } else {
        Err(OwnershipError)
    }
}

/// A record that carries its owning user id directly.
pub trait Owned {
    const KIND: ResourceKind;

    fn owner_id(&self) -> i64;
}

impl Owned for Pet {
    const KIND: ResourceKind = ResourceKind::Pet;

    fn owner_id(&self) -> i64 {
        self.owner_id
    }
}

impl Owned for User {
    const KIND: ResourceKind = ResourceKind::User;

    fn owner_id(&self) -> i64 {
        self.id
    }
}

/// Resolves the result of a fetch by id, in a fixed order: store failure,
/// then not found, then ownership.
pub fn authorize_fetched<T: Owned>(
    fetched: StoreResult<Option<T>>,
    id: i64,
    principal: &Principal,
) -> Result<T, ServiceError> {
    let record = fetched?.ok_or(ServiceError::NotFound { kind: T::KIND, id })?;

    if let Err(e) = check_ownership(record.owner_id(), principal) {
        tracing::debug!(
            user_id = principal.user_id,
            kind = %T::KIND,
            id,
            "Ownership check failed"
        );
        return Err(e.into());
    }

    Ok(record)
}
