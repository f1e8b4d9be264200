// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pin type categories and the static category table

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{TypeError, TypeResult};

/// Top-level kind of a pin type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinCategory {
    Exec,
    Bool,
    Byte,
    Int,
    Float,
    Name,
    String,
    Text,
    Struct,
    Wildcard,
    Enum,
    Object,
    Interface,
    Class,
    Delegate,
    #[serde(rename = "mcdelegate")]
    MulticastDelegate,
    #[serde(rename = "softobject")]
    SoftObject,
    #[serde(rename = "softclass")]
    SoftClass,
}

impl PinCategory {
    /// Every category, in declaration order
    pub const ALL: [PinCategory; 18] = [
        PinCategory::Exec,
        PinCategory::Bool,
        PinCategory::Byte,
        PinCategory::Int,
        PinCategory::Float,
        PinCategory::Name,
        PinCategory::String,
        PinCategory::Text,
        PinCategory::Struct,
        PinCategory::Wildcard,
        PinCategory::Enum,
        PinCategory::Object,
        PinCategory::Interface,
        PinCategory::Class,
        PinCategory::Delegate,
        PinCategory::MulticastDelegate,
        PinCategory::SoftObject,
        PinCategory::SoftClass,
    ];

    /// Stable lowercase identifier, used in signatures and pin-type expressions
    pub fn as_str(self) -> &'static str {
        match self {
            PinCategory::Exec => "exec",
            PinCategory::Bool => "bool",
            PinCategory::Byte => "byte",
            PinCategory::Int => "int",
            PinCategory::Float => "float",
            PinCategory::Name => "name",
            PinCategory::String => "string",
            PinCategory::Text => "text",
            PinCategory::Struct => "struct",
            PinCategory::Wildcard => "wildcard",
            PinCategory::Enum => "enum",
            PinCategory::Object => "object",
            PinCategory::Interface => "interface",
            PinCategory::Class => "class",
            PinCategory::Delegate => "delegate",
            PinCategory::MulticastDelegate => "mcdelegate",
            PinCategory::SoftObject => "softobject",
            PinCategory::SoftClass => "softclass",
        }
    }

    /// Categories whose values reference a class, interface, struct or enum
    pub fn has_subtypes(self) -> bool {
        matches!(
            self,
            PinCategory::Struct
                | PinCategory::Object
                | PinCategory::SoftObject
                | PinCategory::SoftClass
                | PinCategory::Interface
                | PinCategory::Class
                | PinCategory::Enum
        )
    }

    /// Human-readable label for diagnostics
    pub fn display_name(self) -> &'static str {
        match self {
            PinCategory::Exec => "Exec",
            PinCategory::Bool => "Boolean",
            PinCategory::Byte => "Byte",
            PinCategory::Int => "Integer",
            PinCategory::Float => "Float",
            PinCategory::Name => "Name",
            PinCategory::String => "String",
            PinCategory::Text => "Text",
            PinCategory::Struct => "Structure",
            PinCategory::Wildcard => "Wildcard",
            PinCategory::Enum => "Enum",
            PinCategory::Object => "Object Reference",
            PinCategory::Interface => "Interface",
            PinCategory::Class => "Class Reference",
            PinCategory::Delegate => "Delegate",
            PinCategory::MulticastDelegate => "Multicast Delegate",
            PinCategory::SoftObject => "Soft Object Reference",
            PinCategory::SoftClass => "Soft Class Reference",
        }
    }

    pub fn is_delegate(self) -> bool {
        matches!(self, PinCategory::Delegate | PinCategory::MulticastDelegate)
    }

    /// Byte and Int share the bitmask leniency
    pub fn is_integral(self) -> bool {
        matches!(self, PinCategory::Byte | PinCategory::Int)
    }
}

impl fmt::Display for PinCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PinCategory {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        match lowered.as_str() {
            "boolean" => return Ok(PinCategory::Bool),
            "integer" => return Ok(PinCategory::Int),
            "multicastdelegate" => return Ok(PinCategory::MulticastDelegate),
            _ => {}
        }
        PinCategory::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == lowered)
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}

/// Read-only metadata about pin categories
#[derive(Debug)]
pub struct TypeCategoryTable;

impl TypeCategoryTable {
    /// Whether instances of the category can be specialized by a referenced type
    pub fn has_subtypes(category: PinCategory) -> bool {
        category.has_subtypes()
    }

    /// Label used in tooltips and error messages
    pub fn display_name(category: PinCategory) -> &'static str {
        category.display_name()
    }

    /// Look up a category by its identifier or display alias
    pub fn parse(name: &str) -> TypeResult<PinCategory> {
        name.parse()
    }

    /// Iterate over the full category set
    pub fn categories() -> impl Iterator<Item = PinCategory> {
        PinCategory::ALL.iter().copied()
    }
}
