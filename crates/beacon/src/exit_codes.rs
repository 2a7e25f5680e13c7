//! Exit codes for the CLI

#![allow(dead_code)]

/// Success
pub const SUCCESS: i32 = 0;

/// The run failed and the failure was reported
pub const ERROR: i32 = 1;
