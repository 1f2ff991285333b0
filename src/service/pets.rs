use chrono::Utc;
use serde::Deserialize;

use super::ServiceResult;
use super::validation::require;
use crate::auth::{RouteClass, authorize, authorize_fetched};
use crate::store::Store;
use crate::types::{Pet, Principal, User};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewPet {
    pub name: String,
    pub species: String,
    pub breed: String,
    pub medical_history: String,
}

/// Partial update of a pet. Absent, empty or zero fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PetPatch {
    pub name: Option<String>,
    pub species: Option<String>,
    pub breed: Option<String>,
    pub owner_id: Option<i64>,
    pub medical_history: Option<String>,
}

pub struct PetService<'a> {
    store: &'a dyn Store,
}

fn overwrite(target: &mut String, value: Option<String>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        *target = value;
    }
}

impl<'a> PetService<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Fetches a pet, then checks the principal may access it.
    pub fn get(&self, id: i64, principal: &Principal) -> ServiceResult<Pet> {
        authorize_fetched(self.store.get_pet(id), id, principal)
    }

    /// All pets in the clinic, ordered by id.
    pub fn list_all(&self, principal: &Principal, cursor: i64, limit: i32) -> ServiceResult<Vec<Pet>> {
        authorize(RouteClass::StaffOrAbove, principal)?;
        Ok(self.store.list_pets(cursor, limit)?)
    }

    /// Pets owned by the principal.
    pub fn list_own(&self, principal: &Principal) -> ServiceResult<Vec<Pet>> {
        Ok(self.store.list_pets_by_owner(principal.user_id)?)
    }

    pub fn create(&self, new: NewPet, principal: &Principal) -> ServiceResult<Pet> {
        require("name", &new.name)?;

        let now = Utc::now();
        let mut pet = Pet {
            id: 0,
            name: new.name,
            species: new.species,
            breed: new.breed,
            owner_id: principal.user_id,
            medical_history: new.medical_history,
            created_at: now,
            updated_at: now,
        };
        pet.id = self.store.create_pet(&pet)?;

        tracing::info!(pet_id = pet.id, owner_id = pet.owner_id, "Registered pet {}", pet.name);
        Ok(pet)
    }

    pub fn update(&self, id: i64, patch: PetPatch, principal: &Principal) -> ServiceResult<Pet> {
        let mut pet = self.get(id, principal)?;

        overwrite(&mut pet.name, patch.name);
        overwrite(&mut pet.species, patch.species);
        overwrite(&mut pet.breed, patch.breed);
        overwrite(&mut pet.medical_history, patch.medical_history);

        if let Some(owner_id) = patch.owner_id.filter(|&id| id != 0) {
            let owner: User = authorize_fetched(self.store.get_user(owner_id), owner_id, principal)?;
            pet.owner_id = owner.id;
        }
        pet.updated_at = Utc::now();

        self.store.update_pet(&pet)?;
        Ok(pet)
    }

    pub fn delete(&self, id: i64, principal: &Principal) -> ServiceResult<()> {
        let pet = self.get(id, principal)?;
        self.store.delete_pet(pet.id)?;
        tracing::info!(pet_id = pet.id, "Deleted pet {}", pet.name);
        Ok(())
    }
}
