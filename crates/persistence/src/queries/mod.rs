// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries against the career store.
//!
//! ## Module Organization
//!
//! - `audit` — Audit event retrieval
//! - `catalog` — Type ratings and flight legs
//! - `ledger` — Purchases, balance verification and fleet totals
//! - `pireps` — Flight reports
//! - `profiles` — Pilot profiles and statistics

pub mod audit;
pub mod catalog;
pub mod ledger;
pub mod pireps;
pub mod profiles;

pub use ledger::{LedgerCheck, PurchaseRecord};
