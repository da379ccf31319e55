//! Integration tests for hit-validate.
//!
//! These tests run the checks over datasets and geometry tables written to
//! temporary directories.

pub mod check_tests;
pub mod cli_tests;
pub mod full_run_tests;
pub mod output_tests;
