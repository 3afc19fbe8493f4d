//! Retrieval client for the oreluniver.ru timetable portal.
//!
//! The portal is not built for programmatic access: it answers unrecognized
//! clients with a cookie challenge instead of data, and its payload shapes are
//! inconsistent. This crate owns the resilient parts of talking to it --
//! route construction, bounded-retry transport, automated session (cookie +
//! user-agent) refresh, and normalization of raw responses into typed,
//! ordered records. Persistence of the resulting records and the public API
//! serving them live outside this crate.

pub mod config;
pub mod logging;
pub mod session;
pub mod univer;
