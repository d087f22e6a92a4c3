// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! CSV parsing and validation for bulk catalog import.
//!
//! Parsing never touches persistence. Each row is validated on its own and
//! reported; callers only import when every row is valid.

use csv::StringRecord;
use std::collections::{HashMap, HashSet};
use std::str::FromStr;
use va_career_domain::{BodyType, Decimal, FlightLegSpec, Money, Rank, RankTable, TypeRatingSpec};

use crate::error::{ApiError, translate_domain_error};
use crate::request_response::{CsvRowReport, CsvRowStatus};

const FLIGHT_LEG_HEADERS: &[&str] = &[
    "flight_number",
    "origin",
    "destination",
    "aircraft_type",
    "aircraft_family",
    "distance_nm",
    "estimated_minutes",
];

const TYPE_RATING_HEADERS: &[&str] = &[
    "type_name",
    "aircraft_family",
    "purchase_price",
    "base_rate",
    "multiplier",
];

const RANK_HEADERS: &[&str] = &["name", "min_hours"];

/// Validated rows ready for import, plus the per-row report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCsv<T> {
    /// One report per data row.
    pub rows: Vec<CsvRowReport>,
    /// The specs of the valid rows, in row order.
    pub specs: Vec<T>,
}

impl<T> ParsedCsv<T> {
    /// Returns true if every row is valid.
    #[must_use]
    pub fn all_valid(&self) -> bool {
        self.rows.iter().all(|r| r.status == CsvRowStatus::Valid)
    }
}

/// Normalizes a CSV header string for case-insensitive, whitespace-tolerant matching.
fn normalize_header(header: &str) -> String {
    header.trim().to_lowercase().replace([' ', '-'], "_")
}

fn validate_headers(
    headers: &StringRecord,
    required: &[&str],
) -> Result<HashMap<String, usize>, ApiError> {
    let header_map: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| (normalize_header(header), idx))
        .collect();

    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|h| !header_map.contains_key(*h))
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: format!("Missing required headers: {}", missing.join(", ")),
        });
    }

    Ok(header_map)
}

/// Reads the header map and every record, rejecting empty uploads.
fn read_records(
    csv_content: &str,
    required: &[&str],
) -> Result<(HashMap<String, usize>, Vec<StringRecord>), ApiError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(csv_content.as_bytes());

    let headers: StringRecord = reader
        .headers()
        .map_err(|e| ApiError::InvalidCsvFormat {
            reason: format!("Failed to read CSV headers: {e}"),
        })?
        .clone();
    let header_map: HashMap<String, usize> = validate_headers(&headers, required)?;

    let records: Vec<StringRecord> = reader
        .records()
        .enumerate()
        .map(|(idx, record)| {
            record.map_err(|e| ApiError::InvalidCsvFormat {
                reason: format!("Failed to parse row {}: {e}", idx + 1),
            })
        })
        .collect::<Result<Vec<StringRecord>, ApiError>>()?;

    if records.is_empty() {
        return Err(ApiError::InvalidCsvFormat {
            reason: String::from("CSV contains no data rows"),
        });
    }

    Ok((header_map, records))
}

/// Field accessor over one record; blank cells read as missing.
struct Row<'a> {
    record: &'a StringRecord,
    header_map: &'a HashMap<String, usize>,
    errors: Vec<String>,
}

impl<'a> Row<'a> {
    const fn new(record: &'a StringRecord, header_map: &'a HashMap<String, usize>) -> Self {
        Self {
            record,
            header_map,
            errors: Vec::new(),
        }
    }

    fn optional(&self, name: &str) -> Option<String> {
        self.header_map
            .get(name)
            .and_then(|&idx| self.record.get(idx))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }

    fn required(&mut self, name: &str) -> String {
        self.optional(name).unwrap_or_else(|| {
            self.errors
                .push(format!("{name}: required field is missing or empty"));
            String::new()
        })
    }

    fn parsed<T: FromStr>(&mut self, name: &str, value: Option<String>) -> Option<T> {
        let value: String = value?;
        value.parse::<T>().map_or_else(
            |_| {
                self.errors.push(format!("{name}: invalid value '{value}'"));
                None
            },
            Some,
        )
    }

    fn required_parsed<T: FromStr>(&mut self, name: &str) -> Option<T> {
        let value: String = self.required(name);
        if value.is_empty() {
            return None;
        }
        self.parsed(name, Some(value))
    }

    fn flag(&mut self, name: &str) -> bool {
        match self.optional(name).map(|v| v.to_ascii_lowercase()).as_deref() {
            None | Some("false" | "no" | "0") => false,
            Some("true" | "yes" | "1") => true,
            Some(other) => {
                self.errors.push(format!("{name}: invalid boolean '{other}'"));
                false
            }
        }
    }

    fn money(&mut self, name: &str) -> Option<Money> {
        self.required_parsed::<Decimal>(name).map(Money::from_decimal)
    }
}

fn report(row_number: usize, errors: Vec<String>) -> CsvRowReport {
    let status: CsvRowStatus = if errors.is_empty() {
        CsvRowStatus::Valid
    } else {
        CsvRowStatus::Invalid
    };
    CsvRowReport {
        row_number,
        status,
        errors,
    }
}

fn parse_flight_leg_row(row: &mut Row<'_>) -> Option<FlightLegSpec> {
    let flight_number: String = row.required("flight_number");
    let origin: String = row.required("origin");
    let destination: String = row.required("destination");
    let aircraft_type: String = row.required("aircraft_type");
    let aircraft_family: String = row.required("aircraft_family");
    let distance_nm: Option<i64> = row.required_parsed("distance_nm");
    let estimated_minutes: Option<i64> = row.required_parsed("estimated_minutes");
    let locked: bool = row.flag("locked");

    if !row.errors.is_empty() {
        return None;
    }

    let spec: FlightLegSpec = FlightLegSpec {
        flight_number,
        origin,
        destination,
        aircraft_type,
        aircraft_family,
        distance_nm: distance_nm?,
        estimated_minutes: estimated_minutes?,
        locked,
    };
    match spec.validated() {
        Ok(spec) => Some(spec),
        Err(e) => {
            row.errors.push(format!("validation: {e}"));
            None
        }
    }
}

/// Parses and validates a flight leg CSV.
///
/// Required columns: `flight_number`, `origin`, `destination`,
/// `aircraft_type`, `aircraft_family`, `distance_nm`, `estimated_minutes`.
/// An optional `locked` column accepts `true`/`false`.
///
/// # Errors
///
/// Returns `ApiError::InvalidCsvFormat` if the headers are missing, a row
/// cannot be read, or there are no data rows. Row-level problems are
/// reported per row instead.
pub fn parse_flight_legs_csv(csv_content: &str) -> Result<ParsedCsv<FlightLegSpec>, ApiError> {
    let (header_map, records) = read_records(csv_content, FLIGHT_LEG_HEADERS)?;

    let mut parsed: ParsedCsv<FlightLegSpec> = ParsedCsv {
        rows: Vec::with_capacity(records.len()),
        specs: Vec::new(),
    };
    for (idx, record) in records.iter().enumerate() {
        let mut row: Row<'_> = Row::new(record, &header_map);
        if let Some(spec) = parse_flight_leg_row(&mut row) {
            parsed.specs.push(spec);
        }
        parsed.rows.push(report(idx + 1, row.errors));
    }
    Ok(parsed)
}

fn parse_type_rating_row(row: &mut Row<'_>) -> Option<TypeRatingSpec> {
    let type_name: String = row.required("type_name");
    let aircraft_family: String = row.required("aircraft_family");
    let purchase_price: Option<Money> = row.money("purchase_price");
    let base_rate: Option<Money> = row.money("base_rate");
    let multiplier: Option<Decimal> = row.required_parsed("multiplier");
    let seats_value: Option<String> = row.optional("seats");
    let seats: Option<u32> = row.parsed("seats", seats_value);
    let body_type_value: Option<String> = row.optional("body_type");
    let body_type: Option<BodyType> = row.parsed("body_type", body_type_value);
    let is_locked: bool = row.flag("is_locked");

    if !row.errors.is_empty() {
        return None;
    }

    let spec: TypeRatingSpec = TypeRatingSpec {
        type_name,
        aircraft_family,
        purchase_price: purchase_price?,
        base_rate: base_rate?,
        multiplier: multiplier?,
        seats: seats.unwrap_or_default(),
        description: row.optional("description").unwrap_or_default(),
        body_type: body_type.unwrap_or_default(),
        rank_required: row.optional("rank_required"),
        is_locked,
    };
    match spec.validated() {
        Ok(spec) => Some(spec),
        Err(e) => {
            row.errors.push(format!("validation: {e}"));
            None
        }
    }
}

/// Parses and validates a type rating CSV.
///
/// Required columns: `type_name`, `aircraft_family`, `purchase_price`,
/// `base_rate`, `multiplier`. Optional: `seats`, `description`,
/// `body_type`, `rank_required`, `is_locked`.
///
/// Type names must be unique within the file and must not clash with
/// `existing_names`.
///
/// # Errors
///
/// Returns `ApiError::InvalidCsvFormat` if the headers are missing, a row
/// cannot be read, or there are no data rows.
pub fn parse_type_ratings_csv(
    csv_content: &str,
    existing_names: &HashSet<String>,
) -> Result<ParsedCsv<TypeRatingSpec>, ApiError> {
    let (header_map, records) = read_records(csv_content, TYPE_RATING_HEADERS)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut parsed: ParsedCsv<TypeRatingSpec> = ParsedCsv {
        rows: Vec::with_capacity(records.len()),
        specs: Vec::new(),
    };
    for (idx, record) in records.iter().enumerate() {
        let mut row: Row<'_> = Row::new(record, &header_map);
        let spec: Option<TypeRatingSpec> = parse_type_rating_row(&mut row);
        if let Some(spec) = spec {
            if existing_names.contains(&spec.type_name) {
                row.errors.push(format!(
                    "type_name: '{}' already exists in the catalog",
                    spec.type_name
                ));
            } else if !seen.insert(spec.type_name.clone()) {
                row.errors.push(format!(
                    "type_name: duplicate within CSV - '{}' appears multiple times",
                    spec.type_name
                ));
            } else {
                parsed.specs.push(spec);
            }
        }
        parsed.rows.push(report(idx + 1, row.errors));
    }
    Ok(parsed)
}

/// Parses a rank ladder from CSV.
///
/// Columns: `name`, `min_hours`, and an optional `unlock_description`.
/// Unlike catalog imports the ladder is all or nothing: the first bad row
/// fails the whole file.
///
/// # Errors
///
/// Returns an error if the CSV is malformed, a row is invalid, or the
/// resulting ladder is not strictly ascending from zero hours.
pub fn parse_rank_table_csv(csv_content: &str) -> Result<RankTable, ApiError> {
    let (header_map, records) = read_records(csv_content, RANK_HEADERS)?;

    let mut ranks: Vec<Rank> = Vec::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        let mut row: Row<'_> = Row::new(record, &header_map);
        let name: String = row.required("name");
        let min_hours: Option<u32> = row.required_parsed("min_hours");
        let description: String = row.optional("unlock_description").unwrap_or_default();
        match min_hours {
            Some(min_hours) if row.errors.is_empty() => {
                ranks.push(Rank::new(&name, min_hours, &description));
            }
            _ => {
                return Err(ApiError::InvalidCsvFormat {
                    reason: format!("Rank row {}: {}", idx + 1, row.errors.join("; ")),
                });
            }
        }
    }

    RankTable::new(ranks).map_err(translate_domain_error)
}
