// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Database backend-specific code.
//!
//! The career store runs on `SQLite` only. This module holds the pieces
//! that Diesel DSL cannot express: connection setup, PRAGMA handling,
//! migrations and `last_insert_rowid()`. Domain queries and mutations
//! live in `queries/` and `mutations/`.

pub mod sqlite;
