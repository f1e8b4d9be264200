// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Subtype queries with regenerated-type awareness
//!
//! While a script-generated type is being recompiled it can exist twice: the
//! stale version other types still derive from, and the regenerated one that
//! is now authoritative. A derivation or implementation query must succeed if
//! it holds for either version, otherwise pins lose their connections halfway
//! through a recompile. Every query here returns `false` for handles that no
//! longer resolve.

use super::{FunctionInfo, ReflectionService, TypeInfo};
use crate::types::{FunctionHandle, PinType, TypeHandle};

/// A type together with the version it can fall back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeIdentity {
    /// Authoritative version
    pub current: TypeHandle,
    /// Version to retry against when `current` is stale; equal to `current`
    /// for types that were never regenerated
    pub canonical_fallback: TypeHandle,
}

/// Is-a / implements queries over a reflection service
#[derive(Clone, Copy)]
pub struct SubtypeHierarchyOracle<'a> {
    reflection: &'a dyn ReflectionService,
}

impl<'a> SubtypeHierarchyOracle<'a> {
    pub fn new(reflection: &'a dyn ReflectionService) -> Self {
        Self { reflection }
    }

    pub fn reflection(&self) -> &'a dyn ReflectionService {
        self.reflection
    }

    pub fn type_info(&self, handle: TypeHandle) -> Option<&'a TypeInfo> {
        self.reflection.type_info(handle)
    }

    /// Resolve a handle to its authoritative version and fallback
    pub fn identity(&self, handle: TypeHandle) -> Option<TypeIdentity> {
        let info = self.reflection.type_info(handle)?;
        let current = info
            .authoritative
            .filter(|current| self.reflection.type_info(*current).is_some())
            .unwrap_or(handle);
        let canonical_fallback = self
            .reflection
            .type_info(current)
            .and_then(|current_info| current_info.original)
            .or(info.original)
            .unwrap_or(current);
        Some(TypeIdentity {
            current,
            canonical_fallback,
        })
    }

    fn authoritative(&self, handle: TypeHandle) -> TypeHandle {
        self.identity(handle)
            .map(|identity| identity.current)
            .unwrap_or(handle)
    }

    fn original(&self, handle: TypeHandle) -> Option<TypeHandle> {
        self.reflection
            .type_info(handle)
            .and_then(|info| info.original)
            .filter(|original| self.reflection.type_info(*original).is_some())
    }

    /// `candidate` is `ancestor` or derives from it
    pub fn is_child_of(&self, candidate: TypeHandle, ancestor: TypeHandle) -> bool {
        if self.reflection.type_info(candidate).is_none() || self.reflection.type_info(ancestor).is_none() {
            return false;
        }

        if self.authoritative_walk(candidate, ancestor) {
            return true;
        }

        if let Some(original_candidate) = self.original(candidate) {
            if self.authoritative_walk(original_candidate, ancestor) {
                return true;
            }
        }

        if let Some(original_ancestor) = self.original(ancestor) {
            if self.authoritative_walk(candidate, original_ancestor) {
                return true;
            }
        }

        false
    }

    /// Walk the super chain of `candidate` comparing authoritative versions
    fn authoritative_walk(&self, candidate: TypeHandle, ancestor: TypeHandle) -> bool {
        if self.reflection.is_child_of(candidate, ancestor) {
            return true;
        }

        let target = self.authoritative(ancestor);
        let limit = self.reflection.type_count();
        let mut current = Some(candidate);
        let mut steps = 0;
        while let Some(handle) = current {
            if handle == target || self.authoritative(handle) == target {
                return true;
            }
            steps += 1;
            if steps > limit {
                log::warn!("Super chain of {} exceeds registry size", candidate);
                return false;
            }
            current = self.reflection.type_info(handle).and_then(|info| info.super_type);
        }
        false
    }

    /// `class` implements `interface`, directly or through an ancestor
    pub fn implements(&self, class: TypeHandle, interface: TypeHandle) -> bool {
        if self.reflection.type_info(class).is_none() || self.reflection.type_info(interface).is_none() {
            return false;
        }

        let reflection = self.reflection;
        if reflection.implements_interface(class, interface) {
            return true;
        }

        let current_class = self.authoritative(class);
        let current_interface = self.authoritative(interface);
        if (current_class, current_interface) != (class, interface)
            && reflection.implements_interface(current_class, current_interface)
        {
            return true;
        }

        if let Some(original_class) = self.original(class) {
            if reflection.implements_interface(original_class, interface) {
                return true;
            }
        }

        if let Some(original_interface) = self.original(interface) {
            if reflection.implements_interface(class, original_interface) {
                return true;
            }
        }

        false
    }

    /// Both handles are structs with identical flattened field layouts
    pub fn struct_has_same_layout(&self, a: TypeHandle, b: TypeHandle) -> bool {
        match (self.struct_layout(a), self.struct_layout(b)) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    /// Field types of a struct, super type fields first
    fn struct_layout(&self, handle: TypeHandle) -> Option<Vec<&'a PinType>> {
        let mut chain = Vec::new();
        let mut current = Some(handle);
        while let Some(handle) = current {
            let info = self.reflection.type_info(handle)?;
            if !info.is_struct() {
                return None;
            }
            if chain.len() > self.reflection.type_count() {
                return None;
            }
            chain.push(info);
            current = info.super_type;
        }

        Some(
            chain
                .iter()
                .rev()
                .flat_map(|info| info.fields.iter().map(|field| &field.pin_type))
                .collect(),
        )
    }

    pub fn is_interface(&self, handle: TypeHandle) -> bool {
        self.reflection
            .type_info(handle)
            .map(|info| info.is_interface())
            .unwrap_or(false)
    }

    pub fn is_enum(&self, handle: TypeHandle) -> bool {
        self.reflection
            .type_info(handle)
            .map(|info| info.is_enum())
            .unwrap_or(false)
    }

    /// Delegate signature function, re-resolved on the authoritative owner
    /// when the referenced version is not loaded
    pub fn resolve_signature(&self, handle: FunctionHandle) -> Option<&'a FunctionInfo> {
        let function = self.reflection.function_info(handle)?;
        if function.is_loaded {
            return Some(function);
        }

        let owner = function.owner?;
        let current_owner = self.authoritative(owner);
        if current_owner == owner {
            return None;
        }
        let replacement = self.reflection.find_function(current_owner, &function.name)?;
        self.reflection
            .function_info(replacement)
            .filter(|replacement| replacement.is_loaded)
    }
}
