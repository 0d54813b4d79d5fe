//! # qsim-types
//!
//! This crate provides the foundational, shared data types used across the
//! `qsim` workspace. Its purpose is to break dependency cycles by providing
//! a stable, central location for types that `qsim-engine` and `qsim-cli`
//! both need to agree upon.

#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod id;
pub mod metrics;
pub mod scenario;
pub mod time;
