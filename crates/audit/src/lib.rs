// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use time::OffsetDateTime;
use va_career_domain::PilotId;

/// Represents the entity performing an action.
///
/// An actor is any identifiable entity that initiates a state change:
/// a pilot acting on their own career, an administrator, or the system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    /// The unique identifier for this actor.
    pub id: String,
    /// The type of actor (e.g., "pilot", "admin", "system").
    pub actor_type: String,
}

impl Actor {
    /// Creates a new Actor.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this actor
    /// * `actor_type` - The type of actor
    #[must_use]
    pub const fn new(id: String, actor_type: String) -> Self {
        Self { id, actor_type }
    }

    /// Creates an actor for a pilot acting on their own career.
    #[must_use]
    pub fn pilot(pilot_id: &PilotId) -> Self {
        Self::new(pilot_id.value().to_string(), String::from("pilot"))
    }

    /// Creates an actor for a career administrator.
    #[must_use]
    pub fn admin(pilot_id: &PilotId) -> Self {
        Self::new(pilot_id.value().to_string(), String::from("admin"))
    }

    /// Returns true if this actor acted with administrative authority.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.actor_type == "admin"
    }
}

/// Represents the reason or trigger for an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cause {
    /// A unique identifier for this cause (e.g., request ID).
    pub id: String,
    /// A description of the cause.
    pub description: String,
}

impl Cause {
    /// Creates a new Cause.
    ///
    /// # Arguments
    ///
    /// * `id` - The unique identifier for this cause
    /// * `description` - A description of what triggered this action
    #[must_use]
    pub const fn new(id: String, description: String) -> Self {
        Self { id, description }
    }
}

/// Represents the specific action performed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    /// The name of the action (e.g., "`ApprovePirep`", "`PurchaseTypeRating`").
    pub name: String,
    /// Optional additional details about the action.
    pub details: Option<String>,
}

impl Action {
    /// Creates a new Action.
    ///
    /// # Arguments
    ///
    /// * `name` - The name of the action
    /// * `details` - Optional additional details
    #[must_use]
    pub const fn new(name: String, details: Option<String>) -> Self {
        Self { name, details }
    }
}

/// A compact description of the entities touched by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSnapshot {
    /// A `key=value` rendering of the relevant state.
    pub data: String,
}

impl StateSnapshot {
    /// Creates a new `StateSnapshot`.
    ///
    /// # Arguments
    ///
    /// * `data` - A string representation of the state
    #[must_use]
    pub const fn new(data: String) -> Self {
        Self { data }
    }
}

/// An immutable audit event representing a state transition.
///
/// Every successful state change must produce exactly one audit event.
/// Audit events capture:
/// - Who performed the action (actor)
/// - Why it was performed (cause)
/// - What action was performed (action)
/// - The state before and after the transition
/// - Whose career was affected, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// The persisted identifier, assigned on save.
    pub event_id: Option<i64>,
    /// The actor who initiated this state change.
    pub actor: Actor,
    /// The cause or reason for this state change.
    pub cause: Cause,
    /// The action that was performed.
    pub action: Action,
    /// The state before the transition.
    pub before: StateSnapshot,
    /// The state after the transition.
    pub after: StateSnapshot,
    /// The pilot whose career was affected; `None` for catalog changes.
    pub pilot_id: Option<PilotId>,
    /// When the transition was applied.
    pub recorded_at: OffsetDateTime,
}

impl AuditEvent {
    /// Creates a new `AuditEvent`.
    ///
    /// # Arguments
    ///
    /// * `actor` - The actor who initiated the change
    /// * `cause` - The reason for the change
    /// * `action` - The action that was performed
    /// * `before` - The state before the transition
    /// * `after` - The state after the transition
    /// * `pilot_id` - The affected pilot, if any
    /// * `recorded_at` - When the transition was applied
    #[must_use]
    pub const fn new(
        actor: Actor,
        cause: Cause,
        action: Action,
        before: StateSnapshot,
        after: StateSnapshot,
        pilot_id: Option<PilotId>,
        recorded_at: OffsetDateTime,
    ) -> Self {
        Self {
            event_id: None,
            actor,
            cause,
            action,
            before,
            after,
            pilot_id,
            recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn sample_event(pilot: Option<PilotId>) -> AuditEvent {
        AuditEvent::new(
            Actor::admin(&PilotId::new("chief")),
            Cause::new(String::from("req-456"), String::from("Review queue")),
            Action::new(String::from("ApprovePirep"), None),
            StateSnapshot::new(String::from("pirep=1,status=PENDING")),
            StateSnapshot::new(String::from("pirep=1,status=APPROVED")),
            pilot,
            datetime!(2026-03-01 12:00 UTC),
        )
    }

    #[test]
    fn test_actor_helpers_set_type() {
        let pilot: Actor = Actor::pilot(&PilotId::new("p1"));
        assert_eq!(pilot.id, "p1");
        assert_eq!(pilot.actor_type, "pilot");
        assert!(!pilot.is_admin());
        assert!(Actor::admin(&PilotId::new("chief")).is_admin());
    }

    #[test]
    fn test_cause_creation_requires_all_fields() {
        let cause: Cause = Cause::new(String::from("req-456"), String::from("User request"));

        assert_eq!(cause.id, "req-456");
        assert_eq!(cause.description, "User request");
    }

    #[test]
    fn test_action_creation_with_details() {
        let action: Action = Action::new(
            String::from("DeletePirep"),
            Some(String::from("override: duplicate filing")),
        );

        assert_eq!(action.name, "DeletePirep");
        assert_eq!(
            action.details,
            Some(String::from("override: duplicate filing"))
        );
    }

    #[test]
    fn test_new_event_is_unsaved() {
        let event: AuditEvent = sample_event(Some(PilotId::new("p1")));

        assert_eq!(event.event_id, None);
        assert_eq!(event.pilot_id, Some(PilotId::new("p1")));
        assert_eq!(event.before.data, "pirep=1,status=PENDING");
        assert_eq!(event.after.data, "pirep=1,status=APPROVED");
    }

    #[test]
    fn test_catalog_events_have_no_pilot_scope() {
        let event: AuditEvent = sample_event(None);
        assert_eq!(event.pilot_id, None);
        assert_eq!(event.clone(), event);
    }
}
