// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use va_career_domain::{
    FlightLegSpec, LegId, PirepAmendment, PirepDraft, TypeRatingId, TypeRatingSpec,
};

/// A command represents pilot or administrator intent as data only.
///
/// Commands are the only way to request changes to a pilot's career.
/// The leg, report or rating a command targets is carried by the
/// `CareerState` it is applied to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Claim an available leg.
    DispatchLeg,
    /// Mark the pilot's own dispatched leg as flown.
    CompleteLeg,
    /// File a report against the dispatched leg.
    FilePirep {
        /// The pilot's figures.
        draft: PirepDraft,
    },
    /// Edit the figures of a pending report. Omitted fields are kept.
    UpdatePirep {
        /// The edited figures.
        amendment: PirepAmendment,
    },
    /// Delete a report.
    ///
    /// Without a reason only the filing pilot may delete, and only while
    /// the report is pending. With a reason the deletion is an
    /// administrative override that applies to any status.
    DeletePirep {
        /// Reason recorded for an administrative override.
        override_reason: Option<String>,
    },
    /// Approve a pending report and credit the pilot.
    ApprovePirep {
        /// Reviewer notes.
        notes: Option<String>,
    },
    /// Reject a pending report.
    RejectPirep {
        /// Reviewer notes.
        notes: Option<String>,
    },
    /// Buy a type rating from the catalog.
    PurchaseTypeRating {
        /// The rating to buy.
        type_rating_id: TypeRatingId,
    },
    /// Make an owned rating's family the active family.
    ActivateTypeRating {
        /// The rating to activate.
        type_rating_id: TypeRatingId,
    },
    /// Grant or revoke career mode access.
    SetCareerAccess {
        /// The new access flag.
        approved: bool,
    },
}

/// An administrative change to the shared catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogCommand {
    /// Add a type rating.
    CreateTypeRating {
        /// The rating's fields.
        spec: TypeRatingSpec,
    },
    /// Replace a type rating's fields.
    UpdateTypeRating {
        /// The rating to edit.
        type_rating_id: TypeRatingId,
        /// The new fields.
        spec: TypeRatingSpec,
    },
    /// Remove a type rating.
    DeleteTypeRating {
        /// The rating to remove.
        type_rating_id: TypeRatingId,
    },
    /// Add several type ratings at once; all or nothing.
    ImportTypeRatings {
        /// The ratings' fields.
        specs: Vec<TypeRatingSpec>,
    },
    /// Add a flight leg.
    CreateFlightLeg {
        /// The leg's fields.
        spec: FlightLegSpec,
    },
    /// Replace a flight leg's fields.
    UpdateFlightLeg {
        /// The leg to edit.
        leg_id: LegId,
        /// The new fields.
        spec: FlightLegSpec,
    },
    /// Remove a flight leg.
    DeleteFlightLeg {
        /// The leg to remove.
        leg_id: LegId,
        /// Required when the leg is dispatched or completed.
        override_reason: Option<String>,
    },
    /// Add several flight legs at once; all or nothing.
    ImportFlightLegs {
        /// The legs' fields.
        specs: Vec<FlightLegSpec>,
    },
}
