// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Error types for registry population and catalog loading

use thiserror::Error;

use crate::types::TypeError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("Pin type parse error: {0}")]
    ParseError(String),

    #[error("Type not found: {0}")]
    TypeNotFound(String),

    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Cyclic inheritance: {0}")]
    CyclicHierarchy(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        CatalogError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::DeserializationError(err.to_string())
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
