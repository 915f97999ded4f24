//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate board operations and persistence into use-case APIs.
//! - Keep FFI and CLI layers decoupled from storage details.

pub mod board_service;
