//! Benefit Calculation Engine for subsidised employment applications
//!
//! This crate derives the monthly and total benefit amount of an application from
//! its employment facts (pay, dates, pay subsidy decisions and training
//! compensation), records the computation as an ordered ledger of rows, and splits
//! the total into one or two payment instalments.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
