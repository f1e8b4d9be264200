// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! In-memory reflection registry
//!
//! Types and functions live in slot vectors indexed by their handles. Removed
//! entries leave an empty slot behind so stale handles resolve to `None`
//! instead of aliasing a newer entry. Inheritance and interface edges are
//! mirrored in a stable directed graph whose node indices match type handles.

use petgraph::algo::has_path_connecting;
use petgraph::stable_graph::{NodeIndex, StableDiGraph};
use std::collections::HashMap;

use super::{FieldInfo, FunctionInfo, ReflectionService, TypeFlags, TypeInfo, TypeKind};
use crate::catalog::error::{CatalogError, CatalogResult};
use crate::types::{FunctionHandle, TypeHandle};

/// Edge kinds of the hierarchy graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Child to super type
    Derives,
    /// Class to implemented interface
    Implements,
}

/// Reflection registry backing the compatibility core
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: Vec<Option<TypeInfo>>,
    functions: Vec<Option<FunctionInfo>>,
    names: HashMap<String, TypeHandle>,
    hierarchy: StableDiGraph<TypeHandle, Relation>,
    libraries: Vec<TypeHandle>,
    root_object: Option<TypeHandle>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a type and return its handle
    pub fn add_type(&mut self, info: TypeInfo) -> CatalogResult<TypeHandle> {
        if self.names.contains_key(&info.name) {
            return Err(CatalogError::DuplicateEntry(info.name));
        }
        let super_type = info.super_type;
        let interfaces = info.interfaces.clone();

        // Check link targets before committing; a fresh node cannot close a cycle
        if let Some(parent) = super_type {
            self.require(parent)?;
        }
        for interface in &interfaces {
            if !self.require(*interface)?.is_interface() {
                return Err(CatalogError::InvalidOperation(format!(
                    "{} is not an interface",
                    self.names_of(*interface)
                )));
            }
        }

        let handle = TypeHandle(self.types.len() as u32);
        let node = self.hierarchy.add_node(handle);
        debug_assert_eq!(node.index(), handle.index());

        self.names.insert(info.name.clone(), handle);
        if info.is_function_library {
            self.libraries.push(handle);
        }
        let mut info = info;
        info.super_type = None;
        info.interfaces.clear();
        self.types.push(Some(info));

        if let Some(parent) = super_type {
            self.set_super(handle, parent)?;
        }
        for interface in interfaces {
            self.add_interface_impl(handle, interface)?;
        }
        log::trace!("Registered type {} as {}", self.names_of(handle), handle);
        Ok(handle)
    }

    pub fn add_class(&mut self, name: &str, super_type: Option<TypeHandle>) -> CatalogResult<TypeHandle> {
        let mut info = TypeInfo::new(name, TypeKind::Class);
        info.super_type = super_type;
        self.add_type(info)
    }

    pub fn add_interface(&mut self, name: &str, super_type: Option<TypeHandle>) -> CatalogResult<TypeHandle> {
        let mut info = TypeInfo::new(name, TypeKind::Interface);
        info.super_type = super_type;
        self.add_type(info)
    }

    pub fn add_struct(
        &mut self,
        name: &str,
        super_type: Option<TypeHandle>,
        fields: Vec<FieldInfo>,
    ) -> CatalogResult<TypeHandle> {
        let mut info = TypeInfo::new(name, TypeKind::Struct);
        info.super_type = super_type;
        info.fields = fields;
        self.add_type(info)
    }

    pub fn add_enum(&mut self, name: &str, entries: Vec<String>) -> CatalogResult<TypeHandle> {
        let mut info = TypeInfo::new(name, TypeKind::Enum);
        info.enum_entries = entries;
        self.add_type(info)
    }

    /// Register a native function library class
    pub fn add_function_library(&mut self, name: &str) -> CatalogResult<TypeHandle> {
        let mut info = TypeInfo::new(name, TypeKind::Class);
        info.is_function_library = true;
        self.add_type(info)
    }

    /// Designate the base class of all object types
    pub fn set_root_object(&mut self, handle: TypeHandle) {
        self.root_object = Some(handle);
    }

    /// Link `child` to its super type, rejecting cycles
    pub fn set_super(&mut self, child: TypeHandle, parent: TypeHandle) -> CatalogResult<()> {
        self.require(parent)?;
        let previous = self.require(child)?.super_type;

        if child == parent || has_path_connecting(&self.hierarchy, node(parent), node(child), None) {
            return Err(CatalogError::CyclicHierarchy(format!(
                "{} cannot derive from {}",
                self.names_of(child),
                self.names_of(parent)
            )));
        }

        if let Some(previous) = previous {
            if let Some(edge) = self.hierarchy.find_edge(node(child), node(previous)) {
                self.hierarchy.remove_edge(edge);
            }
        }
        self.hierarchy.add_edge(node(child), node(parent), Relation::Derives);
        if let Some(info) = self.slot_mut(child) {
            info.super_type = Some(parent);
        }
        Ok(())
    }

    /// Record that `class` implements `interface`
    pub fn add_interface_impl(&mut self, class: TypeHandle, interface: TypeHandle) -> CatalogResult<()> {
        self.require(class)?;
        if !self.require(interface)?.is_interface() {
            return Err(CatalogError::InvalidOperation(format!(
                "{} is not an interface",
                self.names_of(interface)
            )));
        }
        if self.hierarchy.find_edge(node(class), node(interface)).is_none() {
            self.hierarchy
                .add_edge(node(class), node(interface), Relation::Implements);
        }
        if let Some(info) = self.slot_mut(class) {
            if !info.interfaces.contains(&interface) {
                info.interfaces.push(interface);
            }
        }
        Ok(())
    }

    pub fn add_field(&mut self, owner: TypeHandle, field: FieldInfo) -> CatalogResult<()> {
        self.require(owner)?;
        if let Some(info) = self.slot_mut(owner) {
            info.fields.push(field);
        }
        Ok(())
    }

    /// Register a function declared on `owner`
    pub fn add_function(&mut self, owner: TypeHandle, mut function: FunctionInfo) -> CatalogResult<FunctionHandle> {
        self.require(owner)?;
        if self.find_function(owner, &function.name).is_some() {
            return Err(CatalogError::DuplicateEntry(format!(
                "{}.{}",
                self.names_of(owner),
                function.name
            )));
        }
        let handle = FunctionHandle(self.functions.len() as u32);
        function.owner = Some(owner);
        self.functions.push(Some(function));
        if let Some(info) = self.slot_mut(owner) {
            info.functions.push(handle);
        }
        Ok(handle)
    }

    /// Record that `stale` was regenerated as `current`
    ///
    /// Afterwards `stale` resolves to `current` as its authoritative version
    /// and `current` remembers `stale` as its original.
    pub fn mark_regenerated(&mut self, stale: TypeHandle, current: TypeHandle) -> CatalogResult<()> {
        self.require(stale)?;
        self.require(current)?;
        if let Some(info) = self.slot_mut(stale) {
            info.authoritative = Some(current);
        }
        if let Some(info) = self.slot_mut(current) {
            info.original = Some(stale);
        }
        Ok(())
    }

    pub fn set_flags(&mut self, handle: TypeHandle, flags: TypeFlags) -> CatalogResult<()> {
        self.require(handle)?;
        if let Some(info) = self.slot_mut(handle) {
            info.flags = flags;
        }
        Ok(())
    }

    pub fn set_generated(&mut self, handle: TypeHandle, generated: bool) -> CatalogResult<()> {
        self.require(handle)?;
        if let Some(info) = self.slot_mut(handle) {
            info.is_generated = generated;
        }
        Ok(())
    }

    pub fn set_function_loaded(&mut self, handle: FunctionHandle, loaded: bool) -> CatalogResult<()> {
        match self
            .functions
            .get_mut(handle.index())
            .and_then(|slot| slot.as_mut())
        {
            Some(function) => {
                function.is_loaded = loaded;
                Ok(())
            }
            None => Err(CatalogError::FunctionNotFound(handle.to_string())),
        }
    }

    /// Remove a type together with the functions it declares
    ///
    /// Outstanding handles to the type or its functions resolve to `None`
    /// afterwards.
    pub fn remove_type(&mut self, handle: TypeHandle) -> Option<TypeInfo> {
        let info = self.types.get_mut(handle.index())?.take()?;
        for function in &info.functions {
            if let Some(slot) = self.functions.get_mut(function.index()) {
                *slot = None;
            }
        }
        self.names.remove(&info.name);
        self.libraries.retain(|library| *library != handle);
        if self.root_object == Some(handle) {
            self.root_object = None;
        }
        // The node stays so indices keep matching handles; only its edges go
        let removed = node(handle);
        self.hierarchy.retain_edges(|graph, edge| match graph.edge_endpoints(edge) {
            Some((from, to)) => from != removed && to != removed,
            None => true,
        });
        log::debug!("Removed type {} ({} functions)", info.name, info.functions.len());
        Some(info)
    }

    /// Number of live types
    pub fn len(&self) -> usize {
        self.types.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All live types with their handles
    pub fn types(&self) -> impl Iterator<Item = (TypeHandle, &TypeInfo)> {
        self.types
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|info| (TypeHandle(index as u32), info)))
    }

    fn require(&self, handle: TypeHandle) -> CatalogResult<&TypeInfo> {
        self.type_info(handle)
            .ok_or_else(|| CatalogError::TypeNotFound(handle.to_string()))
    }

    fn slot_mut(&mut self, handle: TypeHandle) -> Option<&mut TypeInfo> {
        self.types.get_mut(handle.index()).and_then(|slot| slot.as_mut())
    }

    fn names_of(&self, handle: TypeHandle) -> String {
        self.type_name(handle)
            .map(str::to_string)
            .unwrap_or_else(|| handle.to_string())
    }
}

fn node(handle: TypeHandle) -> NodeIndex {
    NodeIndex::new(handle.index())
}

impl ReflectionService for TypeRegistry {
    fn type_info(&self, handle: TypeHandle) -> Option<&TypeInfo> {
        self.types.get(handle.index()).and_then(|slot| slot.as_ref())
    }

    fn function_info(&self, handle: FunctionHandle) -> Option<&FunctionInfo> {
        self.functions.get(handle.index()).and_then(|slot| slot.as_ref())
    }

    fn find_type(&self, name: &str) -> Option<TypeHandle> {
        self.names.get(name).copied()
    }

    fn find_function(&self, owner: TypeHandle, name: &str) -> Option<FunctionHandle> {
        self.type_info(owner)?
            .functions
            .iter()
            .copied()
            .find(|handle| {
                self.function_info(*handle)
                    .map(|function| function.name == name)
                    .unwrap_or(false)
            })
    }

    fn function_libraries(&self) -> Vec<TypeHandle> {
        self.libraries.clone()
    }

    fn root_object_type(&self) -> Option<TypeHandle> {
        self.root_object
    }

    fn implements_interface(&self, class: TypeHandle, interface: TypeHandle) -> bool {
        let is_interface = self
            .type_info(interface)
            .map(|info| info.is_interface())
            .unwrap_or(false);
        if !is_interface || class == interface || self.type_info(class).is_none() {
            return false;
        }
        has_path_connecting(&self.hierarchy, node(class), node(interface), None)
    }

    fn type_count(&self) -> usize {
        self.types.len()
    }
}
