// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{NOW, file_report, pilot, seed_catalog};
use crate::{Persistence, PersistenceError};
use va_career_audit::AuditEvent;
use va_career_domain::PilotId;

#[test]
fn test_audit_event_round_trips_through_store() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    let (rating_id, leg_id) = seed_catalog(&mut persistence);
    let pilot_id: PilotId = pilot("p1");
    file_report(&mut persistence, &pilot_id, rating_id, leg_id);

    let events: Vec<AuditEvent> = persistence.list_audit_events(Some(&pilot_id)).unwrap();
    let filing: &AuditEvent = events.last().unwrap();
    let event_id: i64 = filing.event_id.unwrap();

    let loaded: AuditEvent = persistence.get_audit_event(event_id).unwrap();
    assert_eq!(&loaded, filing);
    assert_eq!(loaded.action.name, "FilePirep");
    assert_eq!(loaded.actor.id, "p1");
    assert_eq!(loaded.cause.id, "test-cause");
    assert_eq!(loaded.pilot_id, Some(pilot_id));
    assert_eq!(loaded.recorded_at, NOW);
}

#[test]
fn test_catalog_events_have_no_pilot() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();
    seed_catalog(&mut persistence);
    let pilot_id: PilotId = pilot("p1");

    let all: Vec<AuditEvent> = persistence.list_audit_events(None).unwrap();
    assert_eq!(all.len(), 2);
    assert!(all.iter().all(|event| event.pilot_id.is_none()));
    assert_eq!(all[0].action.name, "CreateTypeRating");
    assert_eq!(all[1].action.name, "CreateFlightLeg");
    assert!(all[0].event_id < all[1].event_id);
    assert!(persistence.list_audit_events(Some(&pilot_id)).unwrap().is_empty());
}

#[test]
fn test_unknown_event_is_reported() {
    let mut persistence: Persistence = Persistence::new_in_memory().unwrap();

    let err: PersistenceError = persistence.get_audit_event(42).unwrap_err();
    assert_eq!(err, PersistenceError::EventNotFound(42));
}
