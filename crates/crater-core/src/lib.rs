//! Core types and definitions for the crater simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, configuration, events, errors, and constants.
//! It has no dependency on any ECS or runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod enums;
pub mod error;
pub mod events;
pub mod types;
