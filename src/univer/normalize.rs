//! Normalization of heterogeneous portal payloads into ordered records.
//!
//! The portal serves list data in two shapes: an object keyed by
//! numeric-string indices (with non-numeric sentinel keys mixed in that carry
//! no records), or a plain array. The shape is resolved once here; each entity
//! family then has its own parse-and-sort function. A parse failure on any
//! single element fails the whole call -- silently dropping malformed rows
//! would hide upstream corruption from the persistence layer.

use crate::univer::json::parse_value_with_path;
use crate::univer::models::{
    DepartmentRef, EmployeeRef, ExamEntry, FacultyRef, GroupRef, ScheduleEntry, ScheduleResult,
    ScheduleRow, SubjectEntry,
};
use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// A payload with its container shape resolved.
#[derive(Debug)]
pub enum RawPayload {
    /// Object keyed by numeric-string indices.
    Indexed(Map<String, Value>),
    Array(Vec<Value>),
}

impl RawPayload {
    pub fn classify(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::Indexed(map)),
            Value::Array(items) => Ok(Self::Array(items)),
            other => bail!("expected an object or array payload, got {other}"),
        }
    }
}

/// Parse a schedule/exam family payload in either container shape.
///
/// For the indexed shape, non-numeric sentinel keys are dropped; everything
/// under a numeric key must parse.
fn records<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    match RawPayload::classify(value)? {
        RawPayload::Indexed(map) => map
            .into_iter()
            .filter(|(key, _)| !key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
            .map(|(key, raw)| {
                parse_value_with_path(raw).with_context(|| format!("record at key `{key}`"))
            })
            .collect(),
        RawPayload::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, raw)| {
                parse_value_with_path(raw).with_context(|| format!("record at index {index}"))
            })
            .collect(),
    }
}

/// Parse a directory family payload. Directories are always plain arrays and
/// keep their upstream order.
pub fn directory<T: serde::de::DeserializeOwned>(value: Value) -> Result<Vec<T>> {
    let RawPayload::Array(items) = RawPayload::classify(value)? else {
        bail!("expected an array payload for a directory listing");
    };
    items
        .into_iter()
        .enumerate()
        .map(|(index, raw)| {
            parse_value_with_path(raw).with_context(|| format!("record at index {index}"))
        })
        .collect()
}

/// Normalize a week of schedule rows: sort by day then lesson number, group
/// into one entry per day.
pub fn schedule(value: Value, week_start: DateTime<Utc>) -> Result<ScheduleResult> {
    let mut rows: Vec<ScheduleRow> = records(value)?;
    rows.sort_by(|a, b| a.date.cmp(&b.date).then(a.number.cmp(&b.number)));

    let mut entries: Vec<ScheduleEntry> = Vec::new();
    for row in rows {
        let subject = SubjectEntry {
            name: row.name,
            sub_group: row.sub_group,
            audience: row.audience,
            building: row.building,
            number: row.number,
            kind: row.kind,
            zoom_link: row.zoom_link,
            zoom_password: row.zoom_password,
        };
        match entries.last_mut() {
            Some(entry) if entry.date == row.date => entry.subjects.push(subject),
            _ => entries.push(ScheduleEntry {
                date: row.date,
                subjects: vec![subject],
            }),
        }
    }

    Ok(ScheduleResult {
        week_start,
        entries,
    })
}

/// Normalize an exam listing, sorted by start time ascending.
///
/// `time` is compared lexicographically; the portal emits fixed-width
/// `"HH:MM"` strings, for which that coincides with chronological order.
pub fn exams(value: Value) -> Result<Vec<ExamEntry>> {
    let mut entries: Vec<ExamEntry> = records(value)?;
    entries.sort_by(|a, b| a.time.cmp(&b.time));
    Ok(entries)
}

pub fn faculties(value: Value) -> Result<Vec<FacultyRef>> {
    directory(value)
}

pub fn departments(value: Value) -> Result<Vec<DepartmentRef>> {
    directory(value)
}

pub fn employees(value: Value) -> Result<Vec<EmployeeRef>> {
    directory(value)
}

pub fn groups(value: Value) -> Result<Vec<GroupRef>> {
    directory(value)
}
