//! Core reprojection building blocks: the affine model, dimension and extent
//! helpers, destination planning, coordinate reconstruction, and the
//! orchestrator. These are the primitives consumed by the high-level `api` module.
pub mod affine;
pub mod params;
pub mod processing;
