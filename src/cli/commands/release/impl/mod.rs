//! Staged release pipeline.

mod context;
mod phases;
mod release;

pub use release::{perform_release, ReleaseStage};
