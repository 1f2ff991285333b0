mod common;

use chrono::{DateTime, TimeZone, Utc};

use common::TestApp;
use petclinic::service::{
    AppointmentPatch, AppointmentService, BusinessHours, NewAppointment, NewPet, ServiceError,
};
use petclinic::types::{Principal, Role};

fn clock() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 10, 8, 0, 0).unwrap()
}

fn principal(app: &TestApp, token: &str) -> Principal {
    app.state.credentials.decode(token).unwrap()
}

#[tokio::test]
async fn test_booking_scenario() {
    let app = TestApp::new();
    let anna = principal(&app, &app.signup("anna").await);
    let bob = principal(&app, &app.signup("bob").await);
    let admin = principal(&app, &app.user_with_role("root", Role::Admin));

    let pets = app.state.pets();
    let rex = pets
        .create(
            NewPet {
                name: "Rex".to_string(),
                ..Default::default()
            },
            &anna,
        )
        .unwrap();
    let milo = pets
        .create(
            NewPet {
                name: "Milo".to_string(),
                ..Default::default()
            },
            &anna,
        )
        .unwrap();

    let service = AppointmentService::new(app.state.store.as_ref(), BusinessHours::default()).at(clock());
    let slot = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();

    // Anna books her own pet.
    let booked = service
        .create(
            NewAppointment {
                slot: slot.into(),
                reason: "checkup".to_string(),
                pet_id: rex.id,
            },
            &anna,
        )
        .unwrap();
    assert_eq!(booked.appointment.slot, slot);

    // Bob booking Anna's pet is rejected on ownership before any slot check,
    // even though the slot is taken.
    let result = service.create(
        NewAppointment {
            slot: slot.into(),
            reason: String::new(),
            pet_id: rex.id,
        },
        &bob,
    );
    assert!(matches!(result, Err(ServiceError::NotOwned(_))));

    // Anna's other pet at the same slot conflicts with the first booking.
    let result = service.create(
        NewAppointment {
            slot: slot.into(),
            reason: String::new(),
            pet_id: milo.id,
        },
        &anna,
    );
    assert!(matches!(
        result,
        Err(ServiceError::SlotConflict { appointment_id }) if appointment_id == booked.appointment.id
    ));

    // Admin reads Anna's appointment.
    let read = service.get(booked.appointment.id, &admin).unwrap();
    assert_eq!(read.pet.id, rex.id);

    // Updating only the reason keeps the slot and passes validation.
    let updated = service
        .update(
            booked.appointment.id,
            AppointmentPatch {
                reason: Some("vaccination".to_string()),
                ..Default::default()
            },
            &anna,
        )
        .unwrap();
    assert_eq!(updated.appointment.slot, slot);
    assert_eq!(updated.appointment.reason, "vaccination");
}

#[tokio::test]
async fn test_local_slot_uses_clinic_offset() {
    let app = TestApp::new();
    let anna = principal(&app, &app.signup("anna").await);
    let rex = app
        .state
        .pets()
        .create(
            NewPet {
                name: "Rex".to_string(),
                ..Default::default()
            },
            &anna,
        )
        .unwrap();

    // UTC-05:00 clinic: 09:00 local is 14:00 UTC.
    let hours = BusinessHours::new(-300, 9, 17).unwrap();
    let service = AppointmentService::new(app.state.store.as_ref(), hours).at(clock());

    let booked = service
        .create(
            serde_json::from_value(serde_json::json!({
                "slot": "2025-01-15T09:00:00",
                "pet_id": rex.id,
            }))
            .unwrap(),
            &anna,
        )
        .unwrap();
    assert_eq!(
        booked.appointment.slot,
        Utc.with_ymd_and_hms(2025, 1, 15, 14, 0, 0).unwrap()
    );

    // 09:00 UTC is 04:00 local.
    let result = service.create(
        NewAppointment {
            slot: Utc.with_ymd_and_hms(2025, 1, 16, 9, 0, 0).unwrap().into(),
            reason: String::new(),
            pet_id: rex.id,
        },
        &anna,
    );
    assert!(matches!(result, Err(ServiceError::InvalidSlot(_))));
}
