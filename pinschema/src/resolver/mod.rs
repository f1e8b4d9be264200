// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pin type compatibility resolution
//!
//! `PinTypeCompatibilityResolver::resolve` decides how an output pin can feed
//! an input pin: directly, through a conversion function, through a
//! specialized conversion node, or not at all. Resolution is a pure function
//! of the two descriptors, the context, and the read-only reflection service;
//! the autocast registry is the only cache it consults.

pub mod compatibility;
pub mod conversion;
pub mod incompatibility;

pub use self::incompatibility::PinLabels;

use serde::Serialize;

use crate::autocast::AutocastFunctionRegistry;
use crate::config::ResolverConfig;
use crate::reflection::{ReflectionService, SubtypeHierarchyOracle};
use crate::types::{ConnectionEndpoint, FunctionHandle, PinCategory, PinDirection, PinType, TypeHandle};

/// Target scope of a function call's self pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelfTarget {
    /// Class declaring the called function
    pub target_scope: TypeHandle,
}

/// Per-query inputs besides the two pin types
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveContext {
    /// Type that `self` pins resolve to
    pub calling_context: Option<TypeHandle>,
    /// Skip the container shape check; set for multi-self pins
    pub ignore_container: bool,
    /// Present when the input is the self pin of a function call
    pub self_target: Option<SelfTarget>,
    /// Whether a scalar wildcard input may take an array
    pub input_wildcard_accepts_array: bool,
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self {
            calling_context: None,
            ignore_container: false,
            self_target: None,
            input_wildcard_accepts_array: true,
        }
    }
}

impl ResolveContext {
    pub fn with_calling_context(mut self, context: TypeHandle) -> Self {
        self.calling_context = Some(context);
        self
    }

    pub fn ignoring_container(mut self) -> Self {
        self.ignore_container = true;
        self
    }

    pub fn with_self_target(mut self, target_scope: TypeHandle) -> Self {
        self.self_target = Some(SelfTarget { target_scope });
        self
    }

    pub fn rejecting_wildcard_arrays(mut self) -> Self {
        self.input_wildcard_accepts_array = false;
        self
    }
}

/// Hard-coded conversion functions that bypass the autocast table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrinsicFunction {
    /// Interface reference to root object reference
    InterfaceToObject,
    /// Object instance to its class
    GetObjectClass,
    /// Object to its display name string
    ObjectDisplayName,
    /// Rotator to transform
    MakeTransform,
}

impl IntrinsicFunction {
    pub fn name(self) -> &'static str {
        match self {
            IntrinsicFunction::InterfaceToObject => "Conv_InterfaceToObject",
            IntrinsicFunction::GetObjectClass => "GetObjectClass",
            IntrinsicFunction::ObjectDisplayName => "GetDisplayName",
            IntrinsicFunction::MakeTransform => "MakeTransform",
        }
    }
}

/// Function inserted to convert between two pin types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "function", rename_all = "snake_case")]
pub enum ConversionFunction {
    /// Entry of the autocast table
    Library(FunctionHandle),
    Intrinsic(IntrinsicFunction),
}

/// Specialized conversion node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionNode {
    /// Copy a set into an array
    SetToArray,
    /// Wrap a single value in an array
    MakeArray,
    /// Read a member of the output object and call on that instead
    FetchMember { field: String, field_type: TypeHandle },
    EnumToName { enum_type: TypeHandle },
    EnumToString { enum_type: TypeHandle },
    /// Byte to enum cast; a safe cast clamps out-of-range values
    ByteToEnum { enum_type: TypeHandle, safe: bool },
    /// Runtime-checked cast to `target`
    DynamicCast { target: TypeHandle },
    /// Soft to hard reference or back
    ConvertAsset { from: PinCategory, to: PinCategory },
}

/// Why two pin types cannot be connected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Incompatibility {
    pub reason: String,
    /// A fatal incompatibility makes the graph uncompilable
    pub is_fatal: bool,
}

/// Outcome of resolving an output pin type against an input pin type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "plan", rename_all = "snake_case")]
pub enum ConversionPlan {
    DirectlyCompatible,
    RequiresConversionFunction { function: ConversionFunction },
    RequiresConversionNode { node: ConversionNode },
    Incompatible(Incompatibility),
}

impl ConversionPlan {
    /// Directly compatible or convertible
    pub fn is_compatible(&self) -> bool {
        !matches!(self, ConversionPlan::Incompatible(_))
    }

    pub fn is_direct(&self) -> bool {
        matches!(self, ConversionPlan::DirectlyCompatible)
    }

    pub fn requires_conversion(&self) -> bool {
        matches!(
            self,
            ConversionPlan::RequiresConversionFunction { .. } | ConversionPlan::RequiresConversionNode { .. }
        )
    }

    pub fn incompatibility(&self) -> Option<&Incompatibility> {
        match self {
            ConversionPlan::Incompatible(incompatibility) => Some(incompatibility),
            _ => None,
        }
    }
}

/// Decides whether and how an output pin type can feed an input pin type
#[derive(Clone, Copy)]
pub struct PinTypeCompatibilityResolver<'a> {
    reflection: &'a dyn ReflectionService,
    autocasts: &'a AutocastFunctionRegistry,
    config: &'a ResolverConfig,
}

impl<'a> PinTypeCompatibilityResolver<'a> {
    pub fn new(
        reflection: &'a dyn ReflectionService,
        autocasts: &'a AutocastFunctionRegistry,
        config: &'a ResolverConfig,
    ) -> Self {
        Self {
            reflection,
            autocasts,
            config,
        }
    }

    pub fn reflection(&self) -> &'a dyn ReflectionService {
        self.reflection
    }

    pub fn config(&self) -> &'a ResolverConfig {
        self.config
    }

    fn oracle(&self) -> SubtypeHierarchyOracle<'a> {
        SubtypeHierarchyOracle::new(self.reflection)
    }

    /// Resolve `output` feeding `input`
    pub fn resolve(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> ConversionPlan {
        if self.are_pins_compatible(output, input, context) {
            log::trace!("{:?} -> {:?}: directly compatible", output.category(), input.category());
            return ConversionPlan::DirectlyCompatible;
        }

        if let Some(plan) = self.find_conversion(output, input, context) {
            log::trace!("{:?} -> {:?}: {:?}", output.category(), input.category(), plan);
            return plan;
        }

        let incompatibility = self.diagnose(output, input, None);
        log::trace!(
            "{:?} -> {:?}: incompatible ({})",
            output.category(),
            input.category(),
            incompatibility.reason
        );
        ConversionPlan::Incompatible(incompatibility)
    }

    /// Resolve a connection attempt between two endpoints given in either order
    ///
    /// `None` when both endpoints face the same direction.
    pub fn resolve_endpoints(
        &self,
        a: &ConnectionEndpoint,
        b: &ConnectionEndpoint,
        context: &ResolveContext,
    ) -> Option<ConversionPlan> {
        let (output, input) = match (a.direction, b.direction) {
            (PinDirection::Output, PinDirection::Input) => (a, b),
            (PinDirection::Input, PinDirection::Output) => (b, a),
            _ => return None,
        };
        Some(self.resolve(&output.pin_type, &input.pin_type, context))
    }

    /// Direct compatibility including the wildcard array restriction
    pub fn are_pins_compatible(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> bool {
        if !context.ignore_container
            && !context.input_wildcard_accepts_array
            && input.is_wildcard()
            && !input.is_array()
            && output.is_array()
        {
            return false;
        }
        self.are_types_compatible(output, input, context)
    }
}
