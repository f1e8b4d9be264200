// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Opaque handles into the reflection registry
//!
//! Handles never own what they point at. A handle may outlive the entry it
//! named (deleted asset, unloaded module), so every lookup through a handle
//! returns an `Option`.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a class, interface, struct or enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TypeHandle(pub u32);

impl TypeHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for TypeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "type#{}", self.0)
    }
}

/// Handle to a function (a conversion function or a delegate signature)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FunctionHandle(pub u32);

impl FunctionHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn#{}", self.0)
    }
}
