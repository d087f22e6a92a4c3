// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Administrative changes to the shared type rating and flight leg catalog.

use crate::command::CatalogCommand;
use crate::error::CoreError;
use crate::state::{CatalogChange, CatalogResult, CatalogState};
use time::OffsetDateTime;
use va_career_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use va_career_domain::{
    FlightLeg, FlightLegSpec, LegId, LegStatus, PilotId, TypeRating, TypeRatingId, TypeRatingSpec,
    require_override_reason, validate_type_name_unique,
};

/// Applies a catalog command, producing the change and an audit event.
///
/// Bulk imports validate every entry before anything is produced; a single
/// bad entry rejects the whole batch.
///
/// # Errors
///
/// Returns an error if:
/// - A spec fails validation
/// - A type name clashes with an existing rating or another batch entry
/// - The targeted rating or leg was not loaded
/// - A dispatched or completed leg is deleted without an override reason
#[allow(clippy::too_many_lines)]
pub fn apply_catalog(
    state: &CatalogState,
    command: CatalogCommand,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<CatalogResult, CoreError> {
    let (change, action, before, after): (CatalogChange, Action, String, String) = match command {
        CatalogCommand::CreateTypeRating { spec } => {
            let rating: TypeRating = new_rating(&state.type_ratings, spec)?;
            let action: Action = Action::new(
                String::from("CreateTypeRating"),
                Some(format!("Created type rating {}", rating.spec.type_name)),
            );
            (
                CatalogChange::TypeRatingsCreated(vec![rating.clone()]),
                action,
                String::from("-"),
                rating_snapshot(&rating),
            )
        }
        CatalogCommand::ImportTypeRatings { specs } => {
            let mut known: Vec<TypeRating> = state.type_ratings.clone();
            let mut created: Vec<TypeRating> = Vec::with_capacity(specs.len());
            for spec in specs {
                let rating: TypeRating = new_rating(&known, spec)?;
                known.push(rating.clone());
                created.push(rating);
            }
            let action: Action = Action::new(
                String::from("ImportTypeRatings"),
                Some(format!("Imported {} type ratings", created.len())),
            );
            let after: String = format!("type_ratings={}", known.len());
            (
                CatalogChange::TypeRatingsCreated(created),
                action,
                format!("type_ratings={}", state.type_ratings.len()),
                after,
            )
        }
        CatalogCommand::UpdateTypeRating {
            type_rating_id,
            spec,
        } => {
            let existing: &TypeRating = find_rating(state, type_rating_id)?;
            let spec: TypeRatingSpec = spec.validated()?;
            validate_type_name_unique(&state.type_ratings, &spec.type_name, Some(type_rating_id))?;
            let updated: TypeRating = TypeRating {
                spec,
                ..existing.clone()
            };
            let action: Action = Action::new(
                String::from("UpdateTypeRating"),
                Some(format!(
                    "Updated type rating {} ({})",
                    type_rating_id, updated.spec.type_name
                )),
            );
            (
                CatalogChange::TypeRatingUpdated(updated.clone()),
                action,
                rating_snapshot(existing),
                rating_snapshot(&updated),
            )
        }
        CatalogCommand::DeleteTypeRating { type_rating_id } => {
            let existing: &TypeRating = find_rating(state, type_rating_id)?;
            let action: Action = Action::new(
                String::from("DeleteTypeRating"),
                Some(format!("Deleted type rating {}", existing.spec.type_name)),
            );
            (
                CatalogChange::TypeRatingDeleted(existing.clone()),
                action,
                rating_snapshot(existing),
                String::from("-"),
            )
        }
        CatalogCommand::CreateFlightLeg { spec } => {
            let leg: FlightLeg = FlightLeg::new(spec.validated()?);
            let action: Action = Action::new(
                String::from("CreateFlightLeg"),
                Some(format!(
                    "Created leg {} {}-{}",
                    leg.spec.flight_number, leg.spec.origin, leg.spec.destination
                )),
            );
            let after: String = leg_snapshot(&leg);
            (
                CatalogChange::FlightLegsCreated(vec![leg]),
                action,
                String::from("-"),
                after,
            )
        }
        CatalogCommand::ImportFlightLegs { specs } => {
            let legs: Vec<FlightLeg> = specs
                .into_iter()
                .map(|spec| spec.validated().map(FlightLeg::new))
                .collect::<Result<Vec<FlightLeg>, _>>()?;
            let action: Action = Action::new(
                String::from("ImportFlightLegs"),
                Some(format!("Imported {} flight legs", legs.len())),
            );
            let after: String = format!("imported_legs={}", legs.len());
            (
                CatalogChange::FlightLegsCreated(legs),
                action,
                String::from("-"),
                after,
            )
        }
        CatalogCommand::UpdateFlightLeg { leg_id, spec } => {
            let existing: &FlightLeg = find_leg(state, leg_id)?;
            let spec: FlightLegSpec = spec.validated()?;
            let updated: FlightLeg = existing.with_spec(spec)?;
            let action: Action = Action::new(
                String::from("UpdateFlightLeg"),
                Some(format!(
                    "Updated leg {leg_id} ({})",
                    updated.spec.flight_number
                )),
            );
            (
                CatalogChange::FlightLegUpdated(updated.clone()),
                action,
                leg_snapshot(existing),
                leg_snapshot(&updated),
            )
        }
        CatalogCommand::DeleteFlightLeg {
            leg_id,
            override_reason,
        } => {
            let existing: &FlightLeg = find_leg(state, leg_id)?;
            let details: String = if existing.status.requires_assignment() {
                let reason: String =
                    require_override_reason("DeleteFlightLeg", override_reason.as_deref())?;
                format!(
                    "Override: deleted {} leg {leg_id} assigned to {} ({reason})",
                    existing.status,
                    existing
                        .assigned_pilot
                        .as_ref()
                        .map_or("nobody", PilotId::value)
                )
            } else {
                format!("Deleted leg {leg_id} ({})", existing.spec.flight_number)
            };
            let action: Action = Action::new(String::from("DeleteFlightLeg"), Some(details));
            (
                CatalogChange::FlightLegDeleted(existing.clone()),
                action,
                leg_snapshot(existing),
                String::from("-"),
            )
        }
    };

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        StateSnapshot::new(before),
        StateSnapshot::new(after),
        None,
        now,
    );

    Ok(CatalogResult {
        change,
        audit_event,
    })
}

fn new_rating(existing: &[TypeRating], spec: TypeRatingSpec) -> Result<TypeRating, CoreError> {
    let spec: TypeRatingSpec = spec.validated()?;
    validate_type_name_unique(existing, &spec.type_name, None)?;
    Ok(TypeRating::new(spec))
}

fn find_rating(state: &CatalogState, id: TypeRatingId) -> Result<&TypeRating, CoreError> {
    state
        .type_ratings
        .iter()
        .find(|r| r.type_rating_id == Some(id))
        .ok_or(CoreError::MissingEntity("type rating"))
}

fn find_leg(state: &CatalogState, id: LegId) -> Result<&FlightLeg, CoreError> {
    state
        .leg
        .as_ref()
        .filter(|leg| leg.leg_id == Some(id))
        .ok_or(CoreError::MissingEntity("flight leg"))
}

fn rating_snapshot(rating: &TypeRating) -> String {
    format!(
        "type_name={},family={},price={},base_rate={},multiplier={},locked={}",
        rating.spec.type_name,
        rating.spec.aircraft_family,
        rating.spec.purchase_price,
        rating.spec.base_rate,
        rating.spec.multiplier,
        rating.spec.is_locked
    )
}

fn leg_snapshot(leg: &FlightLeg) -> String {
    let assigned: &str = match leg.status {
        LegStatus::Dispatched | LegStatus::Completed => leg
            .assigned_pilot
            .as_ref()
            .map_or("-", PilotId::value),
        LegStatus::Available | LegStatus::Locked => "-",
    };
    format!(
        "leg={},flight={},route={}-{},family={},status={},pilot={assigned}",
        leg.id_value(),
        leg.spec.flight_number,
        leg.spec.origin,
        leg.spec.destination,
        leg.spec.aircraft_family,
        leg.status
    )
}
