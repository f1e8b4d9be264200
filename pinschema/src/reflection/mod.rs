// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Reflection service boundary
//!
//! The compatibility core never owns type information. It queries a
//! `ReflectionService` for everything it needs to know about classes,
//! interfaces, structs, enums and functions. `TypeRegistry` is the in-memory
//! implementation used by the CLI, the catalog loader and the tests; a host
//! application can plug in its own.

pub mod hierarchy;
pub mod registry;

pub use self::hierarchy::{SubtypeHierarchyOracle, TypeIdentity};
pub use self::registry::TypeRegistry;

use serde::{Deserialize, Serialize};

use crate::types::{FunctionHandle, PinType, TypeHandle};

/// Kind of a reflected type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    Class,
    Interface,
    Struct,
    Enum,
}

/// Load-state flags of a reflected type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeFlags {
    #[serde(default = "default_true")]
    pub native: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub newer_version_exists: bool,
}

impl Default for TypeFlags {
    fn default() -> Self {
        Self {
            native: true,
            deprecated: false,
            newer_version_exists: false,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Member field of a class or struct
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub pin_type: PinType,
    pub blueprint_visible: bool,
}

impl FieldInfo {
    pub fn new(name: &str, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            pin_type,
            blueprint_visible: true,
        }
    }

    pub fn hidden(mut self) -> Self {
        self.blueprint_visible = false;
        self
    }
}

/// Reflected class, interface, struct or enum
#[derive(Debug, Clone, PartialEq)]
pub struct TypeInfo {
    pub name: String,
    pub path: String,
    pub kind: TypeKind,
    pub super_type: Option<TypeHandle>,
    pub interfaces: Vec<TypeHandle>,
    pub fields: Vec<FieldInfo>,
    pub enum_entries: Vec<String>,
    pub functions: Vec<FunctionHandle>,
    pub flags: TypeFlags,
    /// Produced by a script compiler rather than native code
    pub is_generated: bool,
    /// Marks a class whose functions are scanned for autocasts
    pub is_function_library: bool,
    /// Version this type was regenerated from
    pub original: Option<TypeHandle>,
    /// Currently valid version of this type, when it has been regenerated
    pub authoritative: Option<TypeHandle>,
}

impl TypeInfo {
    pub fn new(name: &str, kind: TypeKind) -> Self {
        Self {
            name: name.to_string(),
            path: format!("/Script/{}", name),
            kind,
            super_type: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            enum_entries: Vec::new(),
            functions: Vec::new(),
            flags: TypeFlags::default(),
            is_generated: false,
            is_function_library: false,
            original: None,
            authoritative: None,
        }
    }

    pub fn is_interface(&self) -> bool {
        self.kind == TypeKind::Interface
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    pub fn is_struct(&self) -> bool {
        self.kind == TypeKind::Struct
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }
}

/// Function-level flags consulted by the autocast scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionFlags {
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_native: bool,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub is_pure: bool,
}

impl FunctionFlags {
    /// Static, native, public and pure
    pub fn pure_static() -> Self {
        Self {
            is_static: true,
            is_native: true,
            is_public: true,
            is_pure: true,
        }
    }

    pub fn has_all(&self, required: &FunctionFlags) -> bool {
        (!required.is_static || self.is_static)
            && (!required.is_native || self.is_native)
            && (!required.is_public || self.is_public)
            && (!required.is_pure || self.is_pure)
    }
}

/// Function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamInfo {
    pub name: String,
    pub pin_type: PinType,
    pub is_output: bool,
    pub is_const: bool,
}

impl ParamInfo {
    pub fn input(name: &str, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            pin_type,
            is_output: false,
            is_const: false,
        }
    }

    pub fn output(name: &str, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            pin_type,
            is_output: true,
            is_const: false,
        }
    }

    /// A const output parameter is a by-reference input
    pub fn is_input(&self) -> bool {
        !self.is_output || self.is_const
    }
}

/// Reflected function
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionInfo {
    pub name: String,
    pub owner: Option<TypeHandle>,
    pub params: Vec<ParamInfo>,
    pub return_type: Option<PinType>,
    pub flags: FunctionFlags,
    pub is_autocast: bool,
    pub is_deprecated: bool,
    /// False while the function is referenced but its module is not loaded
    pub is_loaded: bool,
}

impl FunctionInfo {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            owner: None,
            params: Vec::new(),
            return_type: None,
            flags: FunctionFlags::default(),
            is_autocast: false,
            is_deprecated: false,
            is_loaded: true,
        }
    }

    /// A pure static conversion function tagged for autocasting
    pub fn autocast(name: &str, input: PinType, output: PinType) -> Self {
        Self {
            params: vec![ParamInfo::input("In", input)],
            return_type: Some(output),
            flags: FunctionFlags::pure_static(),
            is_autocast: true,
            ..Self::new(name)
        }
    }

    pub fn inputs(&self) -> impl Iterator<Item = &ParamInfo> {
        self.params.iter().filter(|param| param.is_input())
    }

    /// Same parameter list and return type as `other`
    pub fn is_signature_compatible_with(&self, other: &FunctionInfo) -> bool {
        self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(other.params.iter())
                .all(|(a, b)| a.pin_type == b.pin_type && a.is_output == b.is_output)
            && self.return_type == other.return_type
    }
}

/// Lookups the compatibility core needs from the host's reflection system
pub trait ReflectionService: Send + Sync {
    /// Type behind a handle, if it is still registered
    fn type_info(&self, handle: TypeHandle) -> Option<&TypeInfo>;

    /// Function behind a handle, if it is still registered
    fn function_info(&self, handle: FunctionHandle) -> Option<&FunctionInfo>;

    /// Type by name
    fn find_type(&self, name: &str) -> Option<TypeHandle>;

    /// Function declared directly on `owner`
    fn find_function(&self, owner: TypeHandle, name: &str) -> Option<FunctionHandle>;

    /// Loaded function libraries, in load order
    fn function_libraries(&self) -> Vec<TypeHandle>;

    /// Base class of every object type
    fn root_object_type(&self) -> Option<TypeHandle>;

    /// Plain derivation check along the super-type chain
    fn is_child_of(&self, candidate: TypeHandle, ancestor: TypeHandle) -> bool {
        let limit = self.type_count();
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(handle) = current {
            if handle == ancestor {
                return true;
            }
            steps += 1;
            if steps > limit {
                return false;
            }
            current = self.type_info(handle).and_then(|info| info.super_type);
        }
        false
    }

    /// Plain interface implementation check, including inherited interfaces
    fn implements_interface(&self, class: TypeHandle, interface: TypeHandle) -> bool {
        let is_interface = self
            .type_info(interface)
            .map(|info| info.is_interface())
            .unwrap_or(false);
        if !is_interface {
            return false;
        }
        let limit = self.type_count();
        let mut current = Some(class);
        let mut steps = 0;
        while let Some(handle) = current {
            steps += 1;
            if steps > limit {
                return false;
            }
            let Some(info) = self.type_info(handle) else {
                return false;
            };
            if info
                .interfaces
                .iter()
                .any(|implemented| self.is_child_of(*implemented, interface))
            {
                return true;
            }
            current = info.super_type;
        }
        false
    }

    /// Upper bound on registered types, used to bound hierarchy walks
    fn type_count(&self) -> usize;

    /// Name of a type, if registered
    fn type_name(&self, handle: TypeHandle) -> Option<&str> {
        self.type_info(handle).map(|info| info.name.as_str())
    }
}
