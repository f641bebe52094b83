//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate store and index repositories into use-case level APIs.
//! - Keep the HTTP layer decoupled from storage details.

pub mod entity_service;
