//! Typed records for portal responses.
//!
//! Wire shapes mirror what the portal actually serves; relationships between
//! directory entities are reconstructed by the persistence layer, not here.
//! Lesson/day kind codes stay raw integers -- their meaning is owned by the
//! consumer's enums, and guessing here would only add parse failure modes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Academic year of study, used as a path parameter for group listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Course {
    First,
    Second,
    Third,
    Fourth,
    Fifth,
    Sixth,
}

impl Course {
    pub fn year(self) -> i64 {
        match self {
            Self::First => 1,
            Self::Second => 2,
            Self::Third => 3,
            Self::Fourth => 4,
            Self::Fifth => 5,
            Self::Sixth => 6,
        }
    }
}

/// One raw schedule row as served: a lesson plus the day it falls on.
///
/// The portal flattens day and lesson into a single object per index key;
/// grouping into per-day entries happens in the normalizer.
#[derive(Debug, Clone, Deserialize)]
pub struct ScheduleRow {
    /// Day index in `YYYYMMDD` form.
    pub date: u32,
    pub name: String,
    pub sub_group: i32,
    pub audience: String,
    pub building: i16,
    pub number: i16,
    #[serde(rename = "type")]
    pub kind: i16,
    #[serde(default)]
    pub zoom_link: Option<String>,
    #[serde(default)]
    pub zoom_password: Option<String>,
}

/// One lesson within a day's schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectEntry {
    pub name: String,
    pub sub_group: i32,
    pub audience: String,
    pub building: i16,
    pub number: i16,
    pub kind: i16,
    pub zoom_link: Option<String>,
    pub zoom_password: Option<String>,
}

/// All lessons of a single day, ordered by lesson number.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleEntry {
    pub date: u32,
    pub subjects: Vec<SubjectEntry>,
}

/// A week of schedule data. `entries` is always sorted by `date` ascending.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScheduleResult {
    pub week_start: DateTime<Utc>,
    pub entries: Vec<ScheduleEntry>,
}

/// A single examination. Sequences of these are always sorted by `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamEntry {
    pub day: i16,
    pub date: u32,
    pub name: String,
    pub sub_group: i32,
    #[serde(alias = "dislocation")]
    pub location: String,
    pub number: i16,
    #[serde(rename = "type")]
    pub kind: i16,
    /// Start time as served, fixed-width `"HH:MM"`.
    pub time: String,
    #[serde(default)]
    pub zoom_link: Option<String>,
    #[serde(default)]
    pub zoom_password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyRef {
    pub id: i32,
    pub title: String,
    pub short_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentRef {
    pub id: i32,
    pub title: String,
    pub short_title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmployeeRef {
    pub id: i32,
    pub name: String,
    pub second_name: String,
    pub middle_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: i32,
    pub name: String,
    pub direction: String,
    pub course: i16,
    pub level: i16,
}
