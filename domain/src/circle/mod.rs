//! Session request/response envelope

pub mod request;
pub mod response;

pub use request::{CircleRequest, ValidationError};
pub use response::{CircleResponse, TerminationReason};
