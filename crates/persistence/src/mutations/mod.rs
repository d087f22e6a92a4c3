// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations for the career store.
//!
//! ## Module Organization
//!
//! - `audit` — Audit event persistence
//! - `entities` — Compare-and-set row writers
//! - `career` — Transition orchestration (`persist_transition`)
//! - `catalog` — Catalog change orchestration (`persist_catalog`)
//! - `provisioning` — Lazy profile and statistics creation

pub mod audit;
pub mod career;
pub mod catalog;
pub mod entities;
pub mod provisioning;

pub use audit::persist_audit_event;
pub use career::{PersistTransitionResult, persist_transition};
pub use catalog::{PersistCatalogResult, persist_catalog};
pub use provisioning::get_or_create_career;
