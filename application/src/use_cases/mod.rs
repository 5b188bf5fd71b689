//! Use cases - Application business logic

pub mod run_circle;

pub use run_circle::{RunCircleError, RunCircleUseCase};
