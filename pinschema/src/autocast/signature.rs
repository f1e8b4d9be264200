// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Normalized type signatures used as autocast table keys

use serde::Serialize;
use std::fmt;

use crate::reflection::ReflectionService;
use crate::types::PinType;

/// `category;subcategory;path` encoding of a non-container pin type
///
/// The bitmask flag is not part of the signature, so masked and plain
/// integers share conversion functions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeSignature(String);

impl TypeSignature {
    /// Signature of `pin`, or `None` when it references a type that no
    /// longer resolves
    pub fn of(pin: &PinType, reflection: &dyn ReflectionService) -> Option<Self> {
        let path = match pin.sub_category_type() {
            Some(handle) => reflection.type_info(handle)?.path.as_str(),
            None => "",
        };
        Some(Self(format!(
            "{};{};{}",
            pin.category().as_str(),
            pin.sub_category().as_str(),
            path
        )))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lookup key of the autocast table
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CastKey {
    pub input: TypeSignature,
    pub output: TypeSignature,
}

impl CastKey {
    /// Key for converting a value of type `from` into type `to`
    pub fn new(from: TypeSignature, to: TypeSignature) -> Self {
        Self {
            input: from,
            output: to,
        }
    }
}
