//! # Domain Models
//!
//! Pure configuration and policy types shared by every Shutterbox crate.
//! Keep it lean: no I/O, networking, or heavy logic, just data and simple helpers.

pub mod config;
pub mod constants;
pub mod policy;
