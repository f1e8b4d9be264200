// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! JSON type catalogs
//!
//! A catalog declares classes, interfaces, structs, enums and functions by
//! name and is loaded into a `TypeRegistry`. Loading runs in phases so that
//! declarations may refer to types appearing later in the file: every type is
//! declared first, then hierarchy links, functions and fields are added.
//! Pin types are written as pin type expressions (see `expr`).

pub mod error;
pub mod expr;

pub use self::error::{CatalogError, CatalogResult};
pub use self::expr::{parse_pin_type, parse_pin_type_expr, PinTypeExpr};

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::reflection::{
    FieldInfo, FunctionFlags, FunctionInfo, ParamInfo, ReflectionService, TypeFlags, TypeInfo, TypeKind,
    TypeRegistry,
};

/// Root of a catalog file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Base class of every object type
    #[serde(default)]
    pub root_object: Option<String>,
    #[serde(default)]
    pub types: Vec<TypeEntry>,
    #[serde(default)]
    pub functions: Vec<FunctionEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeEntry {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default, rename = "super")]
    pub super_type: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<String>,
    #[serde(default)]
    pub fields: Vec<FieldEntry>,
    /// Enum entries
    #[serde(default)]
    pub entries: Vec<String>,
    #[serde(default)]
    pub flags: TypeFlags,
    /// Produced by a script compiler
    #[serde(default)]
    pub generated: bool,
    /// Scanned for autocast functions
    #[serde(default)]
    pub library: bool,
    /// Stale type this one was regenerated from
    #[serde(default)]
    pub regenerated_from: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub pin_type: String,
    #[serde(default = "default_true")]
    pub visible: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub pin_type: String,
    #[serde(default)]
    pub output: bool,
    #[serde(default, rename = "const")]
    pub is_const: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEntry {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub params: Vec<ParamEntry>,
    #[serde(default, rename = "return")]
    pub return_type: Option<String>,
    /// Defaults to static, native, public and pure
    #[serde(default = "FunctionFlags::pure_static")]
    pub flags: FunctionFlags,
    #[serde(default)]
    pub autocast: bool,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default = "default_true")]
    pub loaded: bool,
}

fn default_true() -> bool {
    true
}

impl CatalogFile {
    pub fn from_json_str(json: &str) -> CatalogResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CatalogResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| CatalogError::IoError(format!("{}: {}", path.display(), e)))?;
        Self::from_json_str(&contents)
    }

    /// Build a registry holding every declaration of this catalog
    pub fn into_registry(self) -> CatalogResult<TypeRegistry> {
        let mut registry = TypeRegistry::new();

        // Declarations first so any entry can name any other
        for entry in &self.types {
            let mut info = TypeInfo::new(&entry.name, entry.kind);
            info.enum_entries = entry.entries.clone();
            info.flags = entry.flags;
            info.is_generated = entry.generated;
            info.is_function_library = entry.library;
            registry.add_type(info)?;
        }

        for entry in &self.types {
            let handle = lookup(&registry, &entry.name)?;
            if let Some(parent) = &entry.super_type {
                let parent = lookup(&registry, parent)?;
                registry.set_super(handle, parent)?;
            }
            for interface in &entry.interfaces {
                let interface = lookup(&registry, interface)?;
                registry.add_interface_impl(handle, interface)?;
            }
            if let Some(stale) = &entry.regenerated_from {
                let stale = lookup(&registry, stale)?;
                registry.mark_regenerated(stale, handle)?;
            }
        }

        if let Some(root) = &self.root_object {
            let root = lookup(&registry, root)?;
            registry.set_root_object(root);
        }

        for entry in &self.functions {
            let owner = lookup(&registry, &entry.owner)?;
            let mut function = FunctionInfo::new(&entry.name);
            for param in &entry.params {
                let pin_type = parse_pin_type(&param.pin_type, &registry)?;
                function.params.push(ParamInfo {
                    name: param.name.clone(),
                    pin_type,
                    is_output: param.output,
                    is_const: param.is_const,
                });
            }
            function.return_type = entry
                .return_type
                .as_deref()
                .map(|expr| parse_pin_type(expr, &registry))
                .transpose()?;
            function.flags = entry.flags;
            function.is_autocast = entry.autocast;
            function.is_deprecated = entry.deprecated;
            function.is_loaded = entry.loaded;
            registry.add_function(owner, function)?;
        }

        for entry in &self.types {
            if entry.fields.is_empty() {
                continue;
            }
            let handle = lookup(&registry, &entry.name)?;
            for field in &entry.fields {
                let pin_type = parse_pin_type(&field.pin_type, &registry)?;
                let mut info = FieldInfo::new(&field.name, pin_type);
                info.blueprint_visible = field.visible;
                registry.add_field(handle, info)?;
            }
        }

        log::debug!(
            "Loaded catalog: {} types, {} functions",
            self.types.len(),
            self.functions.len()
        );
        Ok(registry)
    }
}

fn lookup(registry: &TypeRegistry, name: &str) -> CatalogResult<crate::types::TypeHandle> {
    registry
        .find_type(name)
        .ok_or_else(|| CatalogError::TypeNotFound(name.to_string()))
}

/// Load a catalog file into a registry
pub fn load_catalog<P: AsRef<Path>>(path: P) -> CatalogResult<TypeRegistry> {
    let path = path.as_ref();
    log::info!("Loading catalog {}", path.display());
    CatalogFile::from_json_file(path)?.into_registry()
}

/// Load catalog JSON text into a registry
pub fn load_catalog_str(json: &str) -> CatalogResult<TypeRegistry> {
    CatalogFile::from_json_str(json)?.into_registry()
}
