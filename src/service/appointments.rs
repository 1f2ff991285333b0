use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::pets::PetService;
use super::schedule::{BusinessHours, SlotTime};
use super::{ResourceKind, ServiceError, ServiceResult};
use crate::auth::{RouteClass, authorize};
use crate::error::Error;
use crate::store::Store;
use crate::types::{Appointment, AppointmentWithPet, Pet, Principal};

#[derive(Debug, Clone, Deserialize)]
pub struct NewAppointment {
    pub slot: SlotTime,
    #[serde(default)]
    pub reason: String,
    pub pet_id: i64,
}

/// Partial update of an appointment. Absent, empty or zero fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppointmentPatch {
    pub slot: Option<SlotTime>,
    pub reason: Option<String>,
    pub pet_id: Option<i64>,
}

/// Books and maintains appointments. Every write is checked by
/// [`AppointmentService::validate`] against the clock captured at construction.
pub struct AppointmentService<'a> {
    store: &'a dyn Store,
    hours: BusinessHours,
    now: DateTime<Utc>,
}

impl<'a> AppointmentService<'a> {
    pub fn new(store: &'a dyn Store, hours: BusinessHours) -> Self {
        Self {
            store,
            hours,
            now: Utc::now(),
        }
    }

    /// Replaces the validation clock.
    #[must_use]
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn pets(&self) -> PetService<'a> {
        PetService::new(self.store)
    }

    /// Checks an appointment before it is written. The first failing rule wins:
    /// pet resolution (with ownership), slot conflict, then the time rules.
    /// Returns the resolved pet.
    pub fn validate(&self, appointment: &Appointment, principal: &Principal) -> ServiceResult<Pet> {
        let pet = self.pets().get(appointment.pet_id, principal)?;

        if let Some(booked) = self.store.get_appointment_by_slot(&appointment.slot)? {
            if booked.id != appointment.id {
                return Err(ServiceError::SlotConflict {
                    appointment_id: booked.id,
                });
            }
        }

        self.hours.check(appointment.slot, self.now)?;

        Ok(pet)
    }

    pub fn get(&self, id: i64, principal: &Principal) -> ServiceResult<AppointmentWithPet> {
        let appointment = self.store.get_appointment(id)?.ok_or(ServiceError::NotFound {
            kind: ResourceKind::Appointment,
            id,
        })?;
        let pet = self.pets().get(appointment.pet_id, principal)?;
        Ok(AppointmentWithPet { appointment, pet })
    }

    pub fn create(&self, new: NewAppointment, principal: &Principal) -> ServiceResult<AppointmentWithPet> {
        let mut appointment = Appointment {
            id: 0,
            slot: self.hours.resolve(new.slot)?,
            reason: new.reason,
            pet_id: new.pet_id,
            created_at: self.now,
            updated_at: self.now,
        };
        let pet = self.validate(&appointment, principal)?;

        appointment.id = self
            .store
            .create_appointment(&appointment)
            .map_err(|e| self.write_conflict(e, &appointment.slot))?;

        tracing::info!(
            appointment_id = appointment.id,
            pet_id = pet.id,
            slot = %appointment.slot,
            "Booked appointment"
        );
        Ok(AppointmentWithPet { appointment, pet })
    }

    /// Merges `patch` into the stored appointment and validates the result.
    pub fn update(
        &self,
        id: i64,
        patch: AppointmentPatch,
        principal: &Principal,
    ) -> ServiceResult<AppointmentWithPet> {
        let AppointmentWithPet {
            mut appointment, ..
        } = self.get(id, principal)?;

        if let Some(slot) = patch.slot {
            appointment.slot = self.hours.resolve(slot)?;
        }
        if let Some(reason) = patch.reason.filter(|r| !r.is_empty()) {
            appointment.reason = reason;
        }
        if let Some(pet_id) = patch.pet_id.filter(|&p| p != 0) {
            appointment.pet_id = pet_id;
        }
        appointment.updated_at = self.now;

        let pet = self.validate(&appointment, principal)?;

        self.store
            .update_appointment(&appointment)
            .map_err(|e| self.write_conflict(e, &appointment.slot))?;

        tracing::info!(appointment_id = appointment.id, slot = %appointment.slot, "Updated appointment");
        Ok(AppointmentWithPet { appointment, pet })
    }

    pub fn delete(&self, id: i64, principal: &Principal) -> ServiceResult<()> {
        let AppointmentWithPet { appointment, .. } = self.get(id, principal)?;
        self.store.delete_appointment(appointment.id)?;
        tracing::info!(appointment_id = appointment.id, "Cancelled appointment");
        Ok(())
    }

    /// Every appointment strictly after now, in slot order.
    pub fn upcoming(&self, principal: &Principal) -> ServiceResult<Vec<AppointmentWithPet>> {
        authorize(RouteClass::StaffOrAbove, principal)?;
        let appointments = self.store.list_appointments_after(&self.now)?;
        self.with_pets(appointments)
    }

    /// Appointments within the current clinic-local day, in slot order.
    pub fn today(&self, principal: &Principal) -> ServiceResult<Vec<AppointmentWithPet>> {
        authorize(RouteClass::StaffOrAbove, principal)?;
        let (start, end) = self
            .hours
            .today_bounds(self.now)
            .ok_or_else(|| ServiceError::invalid("current day is out of range"))?;
        let appointments = self.store.list_appointments_between(&start, &end)?;
        self.with_pets(appointments)
    }

    /// The principal's own appointments strictly after now, in slot order.
    pub fn upcoming_for_owner(&self, principal: &Principal) -> ServiceResult<Vec<AppointmentWithPet>> {
        let appointments = self
            .store
            .list_owner_appointments_after(principal.user_id, &self.now)?;
        self.with_pets(appointments)
    }

    fn with_pets(&self, appointments: Vec<Appointment>) -> ServiceResult<Vec<AppointmentWithPet>> {
        let mut pets: HashMap<i64, Pet> = HashMap::new();
        let mut out = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            let pet = match pets.get(&appointment.pet_id) {
                Some(pet) => pet.clone(),
                None => {
                    let pet = self.store.get_pet(appointment.pet_id)?.ok_or(ServiceError::NotFound {
                        kind: ResourceKind::Pet,
                        id: appointment.pet_id,
                    })?;
                    pets.insert(pet.id, pet.clone());
                    pet
                }
            };
            out.push(AppointmentWithPet { appointment, pet });
        }

        Ok(out)
    }

    /// A uniqueness failure on write means another request booked the slot
    /// between validation and commit.
    fn write_conflict(&self, e: Error, slot: &DateTime<Utc>) -> ServiceError {
        match e {
            Error::AlreadyExists => match self.store.get_appointment_by_slot(slot) {
                Ok(Some(winner)) => {
                    tracing::warn!(appointment_id = winner.id, slot = %slot, "Lost race for slot");
                    ServiceError::SlotConflict {
                        appointment_id: winner.id,
                    }
                }
                Ok(None) => ServiceError::Internal(Error::AlreadyExists),
                Err(e) => ServiceError::Internal(e),
            },
            e => ServiceError::Internal(e),
        }
    }
}
