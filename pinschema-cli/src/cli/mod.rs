// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI module for PinSchema
//!
//! Provides one-off compatibility queries against a JSON type catalog and
//! listings of the autocast table and the category table.

pub mod commands;
pub mod handlers;
pub mod output;

pub use commands::{Cli, Commands};
pub use handlers::{handle_autocasts, handle_categories, handle_resolve};
