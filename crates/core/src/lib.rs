//! DreamTrade Core - Shared settings types.
//!
//! This crate provides the site settings types used across all DreamTrade
//! components:
//! - `admin` - Settings repository, editor sessions and the admin API
//! - `cli` - Command-line tools for migrations and settings management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no HTTP clients. This keeps it lightweight and allows it to be used
//! anywhere, including by the storefront renderer.
//!
//! # Modules
//!
//! - [`types`] - The [`SiteSettings`] record, its [`SettingsField`] table,
//!   default values, and merge-with-defaults

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
