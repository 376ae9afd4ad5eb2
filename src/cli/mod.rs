//! Command Line Interface (CLI) layer for gridwarp.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-file and batch
//! reprojection. It wires user-provided options to the underlying
//! library functionality exposed via `gridwarp::api`.
//!
//! If you are embedding gridwarp into another application, prefer using
//! the high-level `gridwarp::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
