//! Skiff Core
//!
//! Core types and abstractions for the Skiff remote build controller.
//!
//! This crate contains:
//! - Domain types: job identity, build variables, stacks and task descriptors
//! - DTOs: request/response shapes exchanged with the infrastructure backends

pub mod domain;
pub mod dto;
