//! Core use-case services.
//!
//! # Responsibility
//! - Pair a finalized command set with one backend for callers.
//! - Keep CLI and embedding layers decoupled from registry details.

pub mod command_service;
