//! Recurring task scheduler: cron expressions, task records, and the runner.

pub mod expr;
pub mod service;
pub mod types;
