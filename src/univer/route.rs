//! Route construction from templated portal paths.
//!
//! Paths on the portal look like `/schedule//{group_id}///{timestamp}/printschedule`;
//! the repeated slashes are positional slots the upstream router expects to be
//! empty. String parameters are percent-encoded, integers substituted as
//! decimal literals.

use crate::univer::errors::UniverError;
use crate::univer::models::Course;
use reqwest::Method;

/// A single substitutable parameter value.
#[derive(Debug, Clone)]
pub enum RouteParam {
    Str(String),
    Int(i64),
}

impl From<&str> for RouteParam {
    fn from(value: &str) -> Self {
        Self::Str(value.to_owned())
    }
}

impl From<String> for RouteParam {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for RouteParam {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RouteParam {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<u32> for RouteParam {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<Course> for RouteParam {
    fn from(value: Course) -> Self {
        Self::Int(value.year())
    }
}

/// A resolved portal route: method plus a fully substituted path.
///
/// The path is relative; the transport client prepends the configured portal
/// origin. Construction is deterministic and side-effect free.
#[derive(Debug, Clone)]
pub struct Route {
    method: Method,
    path: String,
}

impl Route {
    pub fn new(
        method: Method,
        template: &str,
        params: &[(&str, RouteParam)],
    ) -> Result<Self, UniverError> {
        let mut path = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(open) = rest.find('{') {
            path.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| UniverError::MalformedTemplate(after.to_owned()))?;
            let name = &after[..close];

            let (_, value) = params
                .iter()
                .find(|(key, _)| *key == name)
                .ok_or_else(|| UniverError::MalformedTemplate(name.to_owned()))?;
            match value {
                RouteParam::Str(s) => path.push_str(&urlencoding::encode(s)),
                RouteParam::Int(i) => path.push_str(&i.to_string()),
            }

            rest = &after[close + 1..];
        }
        path.push_str(rest);

        Ok(Self { method, path })
    }

    pub fn get(template: &str, params: &[(&str, RouteParam)]) -> Result<Self, UniverError> {
        Self::new(Method::GET, template, params)
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}
