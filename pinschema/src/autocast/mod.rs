// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Autocast function registry and module change events

pub mod events;
pub mod registry;
pub mod signature;

pub use self::events::{ModuleChangeListener, ModuleEvent, ModuleEventHub, SubscriptionId};
pub use self::registry::{AutocastEntry, AutocastFunctionRegistry, RebuildStats};
pub use self::signature::{CastKey, TypeSignature};

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AutocastError {
    #[error("Duplicate autocast {input} -> {output}: {first} and {second}")]
    DuplicateSignature {
        input: String,
        output: String,
        first: String,
        second: String,
    },
}

pub type AutocastResult<T> = Result<T, AutocastError>;
