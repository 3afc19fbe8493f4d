//! Client for the oreluniver.ru portal.
//!
//! [`UniverApi`] is the caller-facing surface: one typed method per upstream
//! endpoint. Every method returns `Ok(None)` when the transport's retry
//! ceiling is exhausted -- "could not determine state", which callers must
//! keep distinct from an upstream that legitimately reports an empty dataset.

pub mod client;
pub mod errors;
pub mod json;
pub mod models;
pub mod normalize;
pub mod route;
pub mod time;

pub use client::UniverClient;
pub use errors::UniverError;

use crate::config::Config;
use crate::session::SessionManager;
use crate::univer::models::{
    Course, DepartmentRef, EmployeeRef, ExamEntry, FacultyRef, GroupRef, ScheduleResult,
};
use crate::univer::route::Route;
use std::sync::Arc;

pub struct UniverApi {
    client: UniverClient,
}

impl UniverApi {
    pub fn new(config: &Config, session: Arc<SessionManager>) -> Result<Self, UniverError> {
        Ok(Self {
            client: UniverClient::new(config, session)?,
        })
    }

    /// Close the underlying pool; all later calls fail with [`UniverError::Closed`].
    pub fn shutdown(&self) {
        self.client.shutdown();
    }

    /// Establish session credentials up front (e.g. at service startup).
    /// Honors the refresh cooldown; a failed solve surfaces as
    /// [`UniverError::Refresh`].
    pub async fn warm_session(&self) -> Result<(), UniverError> {
        self.client.warm_session().await
    }

    fn malformed(&self, route: &Route, source: anyhow::Error) -> UniverError {
        UniverError::MalformedPayload {
            url: self.client.url_for(route),
            source,
        }
    }

    /// Weekly schedule for a student group. `week_delta` is an offset in weeks,
    /// negative for past weeks.
    pub async fn get_schedule_student(
        &self,
        group_id: i64,
        week_delta: i64,
    ) -> Result<Option<ScheduleResult>, UniverError> {
        let route = Route::get(
            "/schedule//{group_id}///{timestamp}/printschedule",
            &[
                ("group_id", group_id.into()),
                ("timestamp", time::api_timestamp(week_delta).into()),
            ],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::schedule(raw, time::week_start(week_delta))
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// Weekly schedule for an employee.
    pub async fn get_schedule_employee(
        &self,
        employee_id: i64,
        week_delta: i64,
    ) -> Result<Option<ScheduleResult>, UniverError> {
        let route = Route::get(
            "/schedule/{employee_id}////{timestamp}/printschedule",
            &[
                ("employee_id", employee_id.into()),
                ("timestamp", time::api_timestamp(week_delta).into()),
            ],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::schedule(raw, time::week_start(week_delta))
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// Student groups of one faculty and year of study.
    pub async fn get_groups(
        &self,
        faculty_id: i64,
        course: Course,
    ) -> Result<Option<Vec<GroupRef>>, UniverError> {
        let route = Route::get(
            "/schedule/{faculty_id}/{course}/grouplist",
            &[("faculty_id", faculty_id.into()), ("course", course.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::groups(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    pub async fn get_faculties(&self) -> Result<Option<Vec<FacultyRef>>, UniverError> {
        let route = Route::get("/schedule/divisionlistforstuds", &[])?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::faculties(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    pub async fn get_departments(
        &self,
        faculty_id: i64,
    ) -> Result<Option<Vec<DepartmentRef>>, UniverError> {
        let route = Route::get(
            "/schedule/{faculty_id}/kaflist",
            &[("faculty_id", faculty_id.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::departments(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// Employees of one department.
    pub async fn get_employees(
        &self,
        department_id: i64,
    ) -> Result<Option<Vec<EmployeeRef>>, UniverError> {
        let route = Route::get(
            "/schedule/{department_id}/preplist",
            &[("department_id", department_id.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::employees(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// A single employee record. Unlike the list endpoints this one serves a
    /// bare object.
    pub async fn get_employee(
        &self,
        employee_id: i64,
    ) -> Result<Option<EmployeeRef>, UniverError> {
        let route = Route::get(
            "/employee/{employee_id}",
            &[("employee_id", employee_id.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        json::parse_value_with_path(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// Exam schedule for a student group, ordered by start time.
    pub async fn get_exams_student(
        &self,
        group_id: i64,
    ) -> Result<Option<Vec<ExamEntry>>, UniverError> {
        let route = Route::get(
            "/schedule/{group_id}////printexamschedule",
            &[("group_id", group_id.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::exams(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }

    /// Exam schedule for an employee, ordered by start time.
    pub async fn get_exams_employee(
        &self,
        employee_id: i64,
    ) -> Result<Option<Vec<ExamEntry>>, UniverError> {
        let route = Route::get(
            "/schedule//{employee_id}///printexamschedule",
            &[("employee_id", employee_id.into())],
        )?;
        let Some(raw) = self.client.request(&route).await? else {
            return Ok(None);
        };
        normalize::exams(raw)
            .map(Some)
            .map_err(|source| self.malformed(&route, source))
    }
}
