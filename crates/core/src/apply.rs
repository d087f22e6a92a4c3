// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::command::Command;
use crate::error::CoreError;
use crate::state::{CareerChanges, CareerState, PirepChange, RatingPurchase, TransitionResult};
use time::OffsetDateTime;
use va_career_audit::{Action, Actor, AuditEvent, Cause, StateSnapshot};
use va_career_domain::{
    DomainError, FlightLeg, FlightTime, LegStatus, Money, PilotId, PilotProfile, Pirep,
    PirepAmendment, PirepDraft, PirepStatus, RankTable, StatsAggregate, TypeRating, TypeRatingId,
    require_override_reason, resolve_for_aircraft,
};

const DEFAULT_REJECTION_NOTE: &str = "PIREP rejected";

/// Applies a career command to the current state, producing the changes and
/// an audit event.
///
/// # Arguments
///
/// * `state` - The current state (immutable)
/// * `ranks` - The rank ladder used when crediting flight time
/// * `command` - The command to apply
/// * `actor` - The actor performing this action
/// * `cause` - The cause or reason for this action
/// * `now` - The transition time
///
/// # Returns
///
/// * `Ok(TransitionResult)` containing the new state, the changes and the audit event
/// * `Err(CoreError)` if the command is invalid
///
/// # Errors
///
/// Returns an error if:
/// - The command violates domain rules
/// - An entity the command targets was not loaded into `state`
pub fn apply(
    state: &CareerState,
    ranks: &RankTable,
    command: Command,
    actor: Actor,
    cause: Cause,
    now: OffsetDateTime,
) -> Result<TransitionResult, CoreError> {
    let caller: PilotId = PilotId::new(&actor.id);

    let (changes, action): (CareerChanges, Action) = match command {
        Command::DispatchLeg => dispatch_leg(state, now)?,
        Command::CompleteLeg => complete_leg(state, now)?,
        Command::FilePirep { draft } => file_pirep(state, draft, now)?,
        Command::UpdatePirep { amendment } => update_pirep(state, &caller, amendment, now)?,
        Command::DeletePirep { override_reason } => {
            delete_pirep(state, ranks, &caller, override_reason.as_deref())?
        }
        Command::ApprovePirep { notes } => approve_pirep(state, ranks, &caller, notes, now)?,
        Command::RejectPirep { notes } => reject_pirep(state, &caller, notes, now)?,
        Command::PurchaseTypeRating { type_rating_id } => {
            purchase_type_rating(state, type_rating_id, now)?
        }
        Command::ActivateTypeRating { type_rating_id } => {
            activate_type_rating(state, type_rating_id)?
        }
        Command::SetCareerAccess { approved } => set_career_access(state, approved),
    };

    let new_state: CareerState = state.with_changes(&changes);
    let before: StateSnapshot = state.to_snapshot();
    let after: StateSnapshot = new_state.to_snapshot();

    let audit_event: AuditEvent = AuditEvent::new(
        actor,
        cause,
        action,
        before,
        after,
        Some(state.profile.pilot_id.clone()),
        now,
    );

    Ok(TransitionResult {
        new_state,
        changes,
        audit_event,
    })
}

fn dispatch_leg(
    state: &CareerState,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    state.profile.require_career_access()?;
    let leg: &FlightLeg = state.require_leg()?;

    let dispatched: FlightLeg = leg.dispatch(
        &state.profile.pilot_id,
        state.profile.active_family.as_deref(),
        now,
    )?;

    let action: Action = Action::new(
        String::from("DispatchLeg"),
        Some(format!(
            "Dispatched leg {} ({} {}-{}) to {}",
            leg.id_value(),
            leg.spec.flight_number,
            leg.spec.origin,
            leg.spec.destination,
            state.profile.pilot_id
        )),
    );

    Ok((
        CareerChanges {
            leg: Some(dispatched),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn complete_leg(
    state: &CareerState,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    state.profile.require_career_access()?;
    let leg: &FlightLeg = state.require_leg()?;
    require_assigned(leg, &state.profile.pilot_id)?;

    // A leg can only be closed out against a report awaiting review.
    let has_pending_report: bool = state.leg_reports.iter().any(|p| {
        p.leg_id == leg.leg_id
            && p.pilot_id == state.profile.pilot_id
            && p.status == PirepStatus::Pending
    });
    if !has_pending_report {
        return Err(CoreError::DomainViolation(
            DomainError::InvalidLegTransition {
                from: leg.status.as_str().to_string(),
                to: LegStatus::Completed.as_str().to_string(),
                reason: String::from("file a report before completing the leg"),
            },
        ));
    }

    let completed: FlightLeg = leg.complete(now)?;

    let action: Action = Action::new(
        String::from("CompleteLeg"),
        Some(format!(
            "Pilot {} completed leg {}",
            state.profile.pilot_id,
            leg.id_value()
        )),
    );

    Ok((
        CareerChanges {
            leg: Some(completed),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn file_pirep(
    state: &CareerState,
    draft: PirepDraft,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    state.profile.require_career_access()?;
    let leg: &FlightLeg = state.require_leg()?;
    require_assigned(leg, &state.profile.pilot_id)?;

    if leg.status != LegStatus::Dispatched {
        return Err(CoreError::DomainViolation(
            DomainError::InvalidLegTransition {
                from: leg.status.as_str().to_string(),
                to: LegStatus::Completed.as_str().to_string(),
                reason: String::from("reports can only be filed against a dispatched leg"),
            },
        ));
    }

    let already_reported: bool = state
        .leg_reports
        .iter()
        .any(|p| p.leg_id == leg.leg_id && p.status != PirepStatus::Rejected);
    if already_reported {
        return Err(CoreError::DomainViolation(
            DomainError::LegAlreadyReported {
                leg_id: leg.id_value(),
            },
        ));
    }

    let rating: &TypeRating = resolve_for_aircraft(
        &state.type_ratings,
        &leg.spec.aircraft_type,
        &leg.spec.aircraft_family,
    )?;
    let pirep: Pirep = Pirep::file(&state.profile, leg, rating, draft, now)?;

    let action: Action = Action::new(
        String::from("FilePirep"),
        Some(format!(
            "Filed PIREP for leg {} ({}) using {} rates, grand total {}",
            leg.id_value(),
            leg.spec.flight_number,
            rating.spec.type_name,
            pirep.earnings.grand_total
        )),
    );

    Ok((
        CareerChanges {
            pirep: Some(PirepChange::Filed(pirep)),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn update_pirep(
    state: &CareerState,
    caller: &PilotId,
    amendment: PirepAmendment,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    let pirep: &Pirep = state.require_pirep()?;
    pirep.require_filed_by(caller)?;

    let amended: Pirep = pirep.amend(amendment, now)?;

    let action: Action = Action::new(
        String::from("UpdatePirep"),
        Some(format!(
            "Updated PIREP {}: grand total {} -> {}",
            pirep.id_value(),
            pirep.earnings.grand_total,
            amended.earnings.grand_total
        )),
    );

    Ok((
        CareerChanges {
            pirep: Some(PirepChange::Updated(amended)),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn delete_pirep(
    state: &CareerState,
    ranks: &RankTable,
    caller: &PilotId,
    override_reason: Option<&str>,
) -> Result<(CareerChanges, Action), CoreError> {
    let pirep: &Pirep = state.require_pirep()?;

    let Some(reason) = override_reason else {
        pirep.require_filed_by(caller)?;
        pirep.require_pending()?;
        let action: Action = Action::new(
            String::from("DeletePirep"),
            Some(format!("Deleted pending PIREP {}", pirep.id_value())),
        );
        return Ok((
            CareerChanges {
                pirep: Some(PirepChange::Deleted(pirep.clone())),
                ..CareerChanges::default()
            },
            action,
        ));
    };

    let reason: String = require_override_reason("DeletePirep", Some(reason))?;
    let mut changes: CareerChanges = CareerChanges {
        pirep: Some(PirepChange::Deleted(pirep.clone())),
        ..CareerChanges::default()
    };

    // An approved report was credited; deleting it reverses the credit.
    if pirep.status == PirepStatus::Approved {
        require_owner(&state.profile, pirep)?;
        let flight_time: FlightTime = pirep.inputs.flight_time()?;
        let distance_nm: i64 = pirep
            .credited_distance_nm
            .unwrap_or(pirep.snapshot.distance_nm);
        let amount: Money = pirep.earnings.grand_total;

        changes.profile = Some(state.profile.reverse_flight(
            amount,
            flight_time,
            distance_nm,
            ranks,
        )?);
        changes.stats = Some(state.stats.reverse_flight(
            &pirep.snapshot.origin,
            &pirep.snapshot.destination,
            distance_nm,
            flight_time,
            amount,
        ));
    }

    let action: Action = Action::new(
        String::from("DeletePirep"),
        Some(format!(
            "Override: deleted {} PIREP {} ({reason})",
            pirep.status,
            pirep.id_value()
        )),
    );

    Ok((changes, action))
}

fn approve_pirep(
    state: &CareerState,
    ranks: &RankTable,
    reviewer: &PilotId,
    notes: Option<String>,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    let pirep: &Pirep = state.require_pirep()?;
    require_owner(&state.profile, pirep)?;

    let mut approved: Pirep = pirep.review(PirepStatus::Approved, reviewer, notes, now)?;

    // A leg that was deleted after filing no longer contributes distance;
    // the filed snapshot is used instead.
    let leg_update: Option<FlightLeg> = match state.leg.as_ref() {
        Some(leg) => {
            if !leg.is_assigned_to(&pirep.pilot_id) {
                return Err(CoreError::DomainViolation(
                    DomainError::InvalidLegTransition {
                        from: leg.status.as_str().to_string(),
                        to: LegStatus::Completed.as_str().to_string(),
                        reason: String::from("leg is no longer assigned to the reporting pilot"),
                    },
                ));
            }
            match leg.status {
                LegStatus::Dispatched => Some(leg.complete(now)?),
                _ => None,
            }
        }
        None => None,
    };
    let distance_nm: i64 = state
        .leg
        .as_ref()
        .map_or(pirep.snapshot.distance_nm, |leg| leg.spec.distance_nm);
    approved.credited_distance_nm = Some(distance_nm);

    let flight_time: FlightTime = pirep.inputs.flight_time()?;
    let amount: Money = pirep.earnings.grand_total;

    let profile: PilotProfile = state
        .profile
        .credit_flight(amount, flight_time, distance_nm, ranks);
    let stats: StatsAggregate = state.stats.record_flight(
        &pirep.snapshot.origin,
        &pirep.snapshot.destination,
        distance_nm,
        flight_time,
        amount,
        now,
    );

    let action: Action = Action::new(
        String::from("ApprovePirep"),
        Some(format!(
            "Approved PIREP {}: credited {amount}, {flight_time} and {distance_nm} nm to {}",
            pirep.id_value(),
            pirep.pilot_id
        )),
    );

    Ok((
        CareerChanges {
            profile: Some(profile),
            stats: Some(stats),
            leg: leg_update,
            pirep: Some(PirepChange::Updated(approved)),
            purchase: None,
        },
        action,
    ))
}

fn reject_pirep(
    state: &CareerState,
    reviewer: &PilotId,
    notes: Option<String>,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    let pirep: &Pirep = state.require_pirep()?;

    let notes: String = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| String::from(DEFAULT_REJECTION_NOTE));
    let rejected: Pirep = pirep.review(PirepStatus::Rejected, reviewer, Some(notes), now)?;

    let leg_update: Option<FlightLeg> = match state.leg.as_ref() {
        Some(leg)
            if leg.status == LegStatus::Completed && leg.is_assigned_to(&pirep.pilot_id) =>
        {
            Some(leg.revert_completion()?)
        }
        _ => None,
    };

    let action: Action = Action::new(
        String::from("RejectPirep"),
        Some(format!(
            "Rejected PIREP {} filed by {}",
            pirep.id_value(),
            pirep.pilot_id
        )),
    );

    Ok((
        CareerChanges {
            leg: leg_update,
            pirep: Some(PirepChange::Updated(rejected)),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn purchase_type_rating(
    state: &CareerState,
    type_rating_id: TypeRatingId,
    now: OffsetDateTime,
) -> Result<(CareerChanges, Action), CoreError> {
    state.profile.require_career_access()?;
    let rating: &TypeRating = state.require_rating(type_rating_id)?;

    let profile: PilotProfile = state.profile.purchase(rating)?;
    let stats: StatsAggregate = StatsAggregate {
        owned_ratings: profile.owned_ratings.clone(),
        ..state.stats.clone()
    };
    let purchase: RatingPurchase = RatingPurchase {
        pilot_id: profile.pilot_id.clone(),
        type_rating_id,
        type_name: rating.spec.type_name.clone(),
        price: rating.spec.purchase_price,
        purchased_at: now,
    };

    let action: Action = Action::new(
        String::from("PurchaseTypeRating"),
        Some(format!(
            "Purchased {} for {}, balance {} -> {}",
            rating.spec.type_name,
            rating.spec.purchase_price,
            state.profile.balance,
            profile.balance
        )),
    );

    Ok((
        CareerChanges {
            profile: Some(profile),
            stats: Some(stats),
            purchase: Some(purchase),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn activate_type_rating(
    state: &CareerState,
    type_rating_id: TypeRatingId,
) -> Result<(CareerChanges, Action), CoreError> {
    state.profile.require_career_access()?;
    let rating: &TypeRating = state.require_rating(type_rating_id)?;

    let profile: PilotProfile = state.profile.activate(rating, &state.assigned_legs)?;

    let action: Action = Action::new(
        String::from("ActivateTypeRating"),
        Some(format!(
            "Active family {} -> {} ({})",
            state.profile.active_family.as_deref().unwrap_or("none"),
            rating.spec.aircraft_family,
            rating.spec.type_name
        )),
    );

    Ok((
        CareerChanges {
            profile: Some(profile),
            ..CareerChanges::default()
        },
        action,
    ))
}

fn set_career_access(state: &CareerState, approved: bool) -> (CareerChanges, Action) {
    let profile: PilotProfile = state.profile.with_career_access(approved);
    let action: Action = Action::new(
        String::from("SetCareerAccess"),
        Some(format!(
            "Career access for {} {}",
            state.profile.pilot_id,
            if approved { "granted" } else { "revoked" }
        )),
    );
    (
        CareerChanges {
            profile: Some(profile),
            ..CareerChanges::default()
        },
        action,
    )
}

fn require_assigned(leg: &FlightLeg, pilot_id: &PilotId) -> Result<(), CoreError> {
    if !leg.is_assigned_to(pilot_id) {
        return Err(CoreError::DomainViolation(DomainError::NotAssignedPilot {
            leg_id: leg.id_value(),
            pilot_id: pilot_id.value().to_string(),
        }));
    }
    Ok(())
}

fn require_owner(profile: &PilotProfile, pirep: &Pirep) -> Result<(), CoreError> {
    pirep
        .require_filed_by(&profile.pilot_id)
        .map_err(CoreError::from)
}
