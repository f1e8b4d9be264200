// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Autocast function table
//!
//! The table is rebuilt wholesale from the loaded function libraries and is
//! never patched per call. `invalidate` only marks it stale; the next `find`
//! rebuilds it under the write lock, so lookups never observe a half-built
//! table. A failed rebuild empties the table and is remembered until the next
//! invalidation, so lookups do not rescan the same libraries again.

use parking_lot::RwLock;
use std::collections::HashMap;

use super::events::{ModuleChangeListener, ModuleEvent};
use super::signature::{CastKey, TypeSignature};
use super::{AutocastError, AutocastResult};
use crate::config::DuplicatePolicy;
use crate::reflection::{FunctionFlags, FunctionInfo, ReflectionService, TypeInfo};
use crate::types::{FunctionHandle, PinType};

/// Counters reported by a rebuild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RebuildStats {
    pub libraries_scanned: usize,
    pub functions_indexed: usize,
    pub duplicates_replaced: usize,
}

/// One row of the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutocastEntry {
    pub input: TypeSignature,
    pub output: TypeSignature,
    pub function: FunctionHandle,
}

#[derive(Debug, Default)]
struct RegistryState {
    table: HashMap<CastKey, FunctionHandle>,
    stale: bool,
    generation: u64,
    failure: Option<AutocastError>,
}

/// Table of pure static conversion functions keyed by signature pair
#[derive(Debug)]
pub struct AutocastFunctionRegistry {
    state: RwLock<RegistryState>,
    policy: DuplicatePolicy,
}

impl Default for AutocastFunctionRegistry {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl AutocastFunctionRegistry {
    /// Empty registry; the first `find` builds it
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            state: RwLock::new(RegistryState {
                table: HashMap::new(),
                stale: true,
                generation: 0,
                failure: None,
            }),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Mark the table stale; it is rebuilt on the next lookup
    pub fn invalidate(&self) {
        let mut state = self.state.write();
        state.stale = true;
        state.failure = None;
    }

    pub fn is_stale(&self) -> bool {
        self.state.read().stale
    }

    /// Number of completed rebuilds
    pub fn generation(&self) -> u64 {
        self.state.read().generation
    }

    /// Error of the last rebuild, if it failed
    pub fn last_failure(&self) -> Option<AutocastError> {
        self.state.read().failure.clone()
    }

    /// Scan every eligible function library and replace the table
    pub fn rebuild(&self, reflection: &dyn ReflectionService) -> AutocastResult<RebuildStats> {
        match self.scan(reflection) {
            Ok((table, stats)) => {
                let mut state = self.state.write();
                state.table = table;
                state.stale = false;
                state.failure = None;
                state.generation += 1;
                log::debug!(
                    "Rebuilt autocast table: {} functions from {} libraries (generation {})",
                    stats.functions_indexed,
                    stats.libraries_scanned,
                    state.generation
                );
                Ok(stats)
            }
            Err(e) => {
                let mut state = self.state.write();
                state.table.clear();
                state.stale = false;
                state.failure = Some(e.clone());
                Err(e)
            }
        }
    }

    fn scan(
        &self,
        reflection: &dyn ReflectionService,
    ) -> AutocastResult<(HashMap<CastKey, FunctionHandle>, RebuildStats)> {
        let mut table = HashMap::new();
        let mut stats = RebuildStats::default();

        for library in reflection.function_libraries() {
            let Some(library_info) = reflection.type_info(library) else {
                continue;
            };
            if !is_scannable_library(library_info) {
                log::trace!("Skipping function library {}", library_info.name);
                continue;
            }
            stats.libraries_scanned += 1;

            for function in &library_info.functions {
                let Some(info) = reflection.function_info(*function) else {
                    continue;
                };
                let Some(key) = cast_key(info, reflection) else {
                    continue;
                };

                if let Some(previous) = table.insert(key.clone(), *function) {
                    match self.policy {
                        DuplicatePolicy::LastWins => {
                            log::debug!(
                                "Autocast {} -> {}: {} replaces {}",
                                key.input,
                                key.output,
                                function_name(reflection, *function),
                                function_name(reflection, previous)
                            );
                            stats.duplicates_replaced += 1;
                        }
                        DuplicatePolicy::Reject => {
                            return Err(AutocastError::DuplicateSignature {
                                input: key.input.to_string(),
                                output: key.output.to_string(),
                                first: function_name(reflection, previous),
                                second: function_name(reflection, *function),
                            });
                        }
                    }
                } else {
                    stats.functions_indexed += 1;
                }
            }
        }

        Ok((table, stats))
    }

    /// Conversion function turning `output` values into `input` values
    ///
    /// Container types never autocast. Returns `None` when the function found
    /// in the table no longer resolves.
    pub fn find(
        &self,
        reflection: &dyn ReflectionService,
        output: &PinType,
        input: &PinType,
    ) -> Option<FunctionHandle> {
        if output.is_container() || input.is_container() {
            return None;
        }

        if self.is_stale() {
            if let Err(e) = self.rebuild(reflection) {
                log::error!("Autocast table rebuild failed: {}", e);
                return None;
            }
        }

        let key = CastKey::new(
            TypeSignature::of(output, reflection)?,
            TypeSignature::of(input, reflection)?,
        );
        let function = self.state.read().table.get(&key).copied()?;
        reflection.function_info(function).map(|_| function)
    }

    /// Every row, ordered by signature
    pub fn entries(&self) -> Vec<AutocastEntry> {
        let state = self.state.read();
        let mut entries: Vec<AutocastEntry> = state
            .table
            .iter()
            .map(|(key, function)| AutocastEntry {
                input: key.input.clone(),
                output: key.output.clone(),
                function: *function,
            })
            .collect();
        entries.sort_by(|a, b| (&a.input, &a.output).cmp(&(&b.input, &b.output)));
        entries
    }

    pub fn len(&self) -> usize {
        self.state.read().table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ModuleChangeListener for AutocastFunctionRegistry {
    fn on_module_event(&self, event: &ModuleEvent) {
        log::info!("{}; invalidating autocast table", event);
        self.invalidate();
    }
}

fn is_scannable_library(info: &TypeInfo) -> bool {
    info.flags.native && !info.flags.deprecated && !info.flags.newer_version_exists
}

/// Key of an autocast candidate, or `None` when the function does not qualify
fn cast_key(info: &FunctionInfo, reflection: &dyn ReflectionService) -> Option<CastKey> {
    if info.is_deprecated || !info.is_autocast {
        return None;
    }
    if !info.flags.has_all(&FunctionFlags::pure_static()) {
        return None;
    }
    let output = info.return_type.as_ref()?;

    let mut inputs = info.inputs();
    let input = inputs.next()?;
    if inputs.next().is_some() {
        return None;
    }

    Some(CastKey::new(
        TypeSignature::of(&input.pin_type, reflection)?,
        TypeSignature::of(output, reflection)?,
    ))
}

fn function_name(reflection: &dyn ReflectionService, handle: FunctionHandle) -> String {
    match reflection.function_info(handle) {
        Some(info) => {
            let owner = info
                .owner
                .and_then(|owner| reflection.type_name(owner))
                .unwrap_or("?");
            format!("{}.{}", owner, info.name)
        }
        None => handle.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::{ParamInfo, TypeFlags, TypeRegistry};
    use crate::types::PinCategory;

    fn int() -> PinType {
        PinType::new(PinCategory::Int)
    }

    fn float() -> PinType {
        PinType::new(PinCategory::Float)
    }

    fn math_registry() -> (TypeRegistry, FunctionHandle) {
        let mut registry = TypeRegistry::new();
        let library = registry.add_function_library("MathLibrary").unwrap();
        let conv = registry
            .add_function(library, FunctionInfo::autocast("Conv_IntToFloat", int(), float()))
            .unwrap();
        (registry, conv)
    }

    #[test]
    fn test_find_builds_lazily() {
        let (registry, conv) = math_registry();
        let autocasts = AutocastFunctionRegistry::default();
        assert!(autocasts.is_stale());

        assert_eq!(autocasts.find(&registry, &int(), &float()), Some(conv));
        assert_eq!(autocasts.find(&registry, &float(), &int()), None);
        assert_eq!(autocasts.generation(), 1);
        assert!(!autocasts.is_stale());
    }

    #[test]
    fn test_containers_never_autocast() {
        let (registry, _) = math_registry();
        let autocasts = AutocastFunctionRegistry::default();
        assert_eq!(autocasts.find(&registry, &int().as_array(), &float().as_array()), None);
    }

    #[test]
    fn test_bitmask_int_uses_plain_conversion() {
        let (registry, conv) = math_registry();
        let autocasts = AutocastFunctionRegistry::default();
        assert_eq!(autocasts.find(&registry, &int().bitmask(), &float()), Some(conv));
    }

    #[test]
    fn test_candidate_filtering() {
        let mut registry = TypeRegistry::new();
        let library = registry.add_function_library("Conversions").unwrap();

        let mut impure = FunctionInfo::autocast("Conv_BoolToInt", PinType::new(PinCategory::Bool), int());
        impure.flags.is_pure = false;
        registry.add_function(library, impure).unwrap();

        let mut untagged = FunctionInfo::autocast("Conv_IntToBool", int(), PinType::new(PinCategory::Bool));
        untagged.is_autocast = false;
        registry.add_function(library, untagged).unwrap();

        let mut deprecated = FunctionInfo::autocast("Conv_IntToName", int(), PinType::new(PinCategory::Name));
        deprecated.is_deprecated = true;
        registry.add_function(library, deprecated).unwrap();

        let mut two_inputs = FunctionInfo::autocast("Conv_IntToText", int(), PinType::new(PinCategory::Text));
        two_inputs.params.push(ParamInfo::input("Extra", int()));
        registry.add_function(library, two_inputs).unwrap();

        // A const output parameter counts as the input
        let mut by_ref = FunctionInfo::autocast("Conv_FloatToString", float(), PinType::new(PinCategory::String));
        by_ref.params = vec![ParamInfo {
            is_const: true,
            ..ParamInfo::output("In", float())
        }];
        let by_ref = registry.add_function(library, by_ref).unwrap();

        let autocasts = AutocastFunctionRegistry::default();
        let stats = autocasts.rebuild(&registry).unwrap();
        assert_eq!(stats.functions_indexed, 1);
        assert_eq!(
            autocasts.find(&registry, &float(), &PinType::new(PinCategory::String)),
            Some(by_ref)
        );
    }

    #[test]
    fn test_deprecated_library_is_skipped() {
        let (mut registry, _) = math_registry();
        let library = registry.find_type("MathLibrary").unwrap();
        registry
            .set_flags(
                library,
                TypeFlags {
                    deprecated: true,
                    ..TypeFlags::default()
                },
            )
            .unwrap();

        let autocasts = AutocastFunctionRegistry::default();
        let stats = autocasts.rebuild(&registry).unwrap();
        assert_eq!(stats.libraries_scanned, 0);
        assert!(autocasts.is_empty());
    }

    #[test]
    fn test_duplicate_policies() {
        let (mut registry, _) = math_registry();
        let other = registry.add_function_library("OtherMathLibrary").unwrap();
        let later = registry
            .add_function(other, FunctionInfo::autocast("IntToFloat", int(), float()))
            .unwrap();

        let last_wins = AutocastFunctionRegistry::new(DuplicatePolicy::LastWins);
        let stats = last_wins.rebuild(&registry).unwrap();
        assert_eq!(stats.duplicates_replaced, 1);
        assert_eq!(last_wins.find(&registry, &int(), &float()), Some(later));

        let strict = AutocastFunctionRegistry::new(DuplicatePolicy::Reject);
        assert!(matches!(
            strict.rebuild(&registry),
            Err(AutocastError::DuplicateSignature { .. })
        ));
        assert_eq!(strict.find(&registry, &int(), &float()), None);
    }

    #[test]
    fn test_failed_rebuild_is_not_retried_until_invalidated() {
        let (mut registry, conv) = math_registry();
        let other = registry.add_function_library("OtherMathLibrary").unwrap();
        registry
            .add_function(other, FunctionInfo::autocast("IntToFloat", int(), float()))
            .unwrap();

        let strict = AutocastFunctionRegistry::new(DuplicatePolicy::Reject);
        assert_eq!(strict.find(&registry, &int(), &float()), None);
        assert!(!strict.is_stale());
        assert!(matches!(
            strict.last_failure(),
            Some(AutocastError::DuplicateSignature { .. })
        ));
        assert_eq!(strict.generation(), 0);

        // Removing the duplicate has no effect until the table is invalidated
        registry.remove_type(other);
        assert_eq!(strict.find(&registry, &int(), &float()), None);

        strict.invalidate();
        assert_eq!(strict.find(&registry, &int(), &float()), Some(conv));
        assert_eq!(strict.last_failure(), None);
        assert_eq!(strict.generation(), 1);
    }

    #[test]
    fn test_failed_rebuild_drops_previous_table() {
        let (mut registry, conv) = math_registry();
        let strict = AutocastFunctionRegistry::new(DuplicatePolicy::Reject);
        assert_eq!(strict.find(&registry, &int(), &float()), Some(conv));

        let other = registry.add_function_library("OtherMathLibrary").unwrap();
        registry
            .add_function(other, FunctionInfo::autocast("IntToFloat", int(), float()))
            .unwrap();
        assert!(strict.rebuild(&registry).is_err());
        assert!(strict.is_empty());
        assert_eq!(strict.find(&registry, &int(), &float()), None);
    }

    #[test]
    fn test_invalidate_picks_up_new_libraries() {
        let (mut registry, _) = math_registry();
        let autocasts = AutocastFunctionRegistry::default();
        let to_string = PinType::new(PinCategory::String);
        assert_eq!(autocasts.find(&registry, &int(), &to_string), None);

        let library = registry.add_function_library("StringLibrary").unwrap();
        let conv = registry
            .add_function(library, FunctionInfo::autocast("Conv_IntToString", int(), to_string.clone()))
            .unwrap();

        // Still the old table until invalidated
        assert_eq!(autocasts.find(&registry, &int(), &to_string), None);
        autocasts.on_module_event(&ModuleEvent::Loaded("StringLibrary".to_string()));
        assert_eq!(autocasts.find(&registry, &int(), &to_string), Some(conv));
        assert_eq!(autocasts.generation(), 2);
    }

    #[test]
    fn test_removed_function_is_not_returned() {
        let (mut registry, _) = math_registry();
        let autocasts = AutocastFunctionRegistry::default();
        autocasts.rebuild(&registry).unwrap();

        let library = registry.find_type("MathLibrary").unwrap();
        registry.remove_type(library);
        assert_eq!(autocasts.find(&registry, &int(), &float()), None);
    }
}
