//! Integration test suite for cloudconfig
//!
//! End-to-end tests that run the `cloudconfig` binary against temporary projects.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **apply**: create, unchanged and update outcomes and the state file they leave
//! - **plan**: pending change reporting and `--detailed-exitcode`
//! - **render**: pipeline output on stdout and to files
//! - **validate**: standalone document validation in text and JSON
//! - **destroy_show**: forgetting and inspecting recorded resources
//! - **errors**: project, template and validation failures

#[path = "../common/mod.rs"]
mod common;

mod apply;
mod destroy_show;
mod errors;
mod plan;
mod render;
mod validate;
