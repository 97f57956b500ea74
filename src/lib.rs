//! Onboarding wizards for organizations and their employees.

pub mod config;
pub mod employee;
pub mod error;
pub mod organization;
pub mod services;
pub mod wizard;

pub use error::{Error, Result};
