//! Data Transfer Objects for REST request/response serialization.

pub mod emit_dto;

pub use emit_dto::*;
