// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pin type data model
//!
//! This module holds the value types every other component works on: the
//! category table, the `PinType` descriptor, handles into the reflection
//! registry, and the human-readable rendering used by diagnostics.

pub mod category;
pub mod descriptor;
pub mod display;
pub mod handle;

pub use self::category::{PinCategory, TypeCategoryTable};
pub use self::descriptor::{
    ConnectionEndpoint, ContainerShape, PinDirection, PinSubCategory, PinTerminalType, PinType,
};
pub use self::display::{terminal_type_to_text, type_to_text};
pub use self::handle::{FunctionHandle, TypeHandle};

use thiserror::Error;

/// Type error for descriptor construction and parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    #[error("Unknown pin category: {0}")]
    UnknownCategory(String),

    #[error("Invalid type specification: {0}")]
    InvalidTypeSpecification(String),

    #[error("Unknown type: {0}")]
    UnknownType(String),
}

/// Result type for type system operations
pub type TypeResult<T> = Result<T, TypeError>;
