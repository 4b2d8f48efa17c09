//! Setup engine for the StepUp ADFS MFA plugin

pub mod config;
pub mod install;
