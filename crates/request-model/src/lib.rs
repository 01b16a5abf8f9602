//! Remix Request Model
//!
//! Defines the data contracts for a Remix batch:
//! - **Clips:** Input media descriptors and group declarations
//! - **Configuration:** The mixing options for one batch
//! - **Plans:** Render plans, compiled graphs, failures, and warnings
//! - **Requests/Reports:** JSON files exchanged with callers
//!
//! Everything here is plain data. Planning and compilation live in
//! `remix-planner` and `remix-graph`.

pub mod clip;
pub mod config;
pub mod geometry;
pub mod plan;
pub mod report;
pub mod request;

pub use clip::*;
pub use config::*;
pub use geometry::*;
pub use plan::*;
pub use report::*;
pub use request::*;
