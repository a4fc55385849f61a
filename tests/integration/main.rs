//! API integration tests, run in-process against an in-memory database

mod accounts;
mod catalog;
mod common;
mod loans;
