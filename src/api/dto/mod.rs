//! Data Transfer Objects for REST request/response serialization.
//!
//! Read endpoints return the domain entities directly; DTOs cover request
//! bodies and write/report responses.

pub mod common_dto;
pub mod donation_dto;

pub use common_dto::*;
pub use donation_dto::*;
