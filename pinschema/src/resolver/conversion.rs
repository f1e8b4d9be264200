// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Conversion search for pin types that are not directly compatible
//!
//! Candidates are tried in a fixed priority order and the first match wins:
//! set to array, scalar to array, self member fetch, enum to name or string,
//! byte to enum, intrinsic functions, the autocast table, dynamic casts, and
//! finally soft/hard asset conversions.

use super::{
    ConversionFunction, ConversionNode, ConversionPlan, IntrinsicFunction, PinTypeCompatibilityResolver,
    ResolveContext,
};
use crate::types::{ContainerShape, PinCategory, PinType, TypeHandle};

impl<'a> PinTypeCompatibilityResolver<'a> {
    /// First conversion bridging `output` to `input`, if any
    pub fn find_conversion(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> Option<ConversionPlan> {
        if let Some(node) = self.container_conversion(output, input, context) {
            return Some(ConversionPlan::RequiresConversionNode { node });
        }

        if output.is_container() || input.is_container() {
            return None;
        }

        if let Some(node) = self.member_fetch(output, context) {
            return Some(ConversionPlan::RequiresConversionNode { node });
        }

        if let Some(node) = self.enum_conversion(output, input) {
            return Some(ConversionPlan::RequiresConversionNode { node });
        }

        if let Some(function) = self.intrinsic_function(output, input) {
            return Some(ConversionPlan::RequiresConversionFunction {
                function: ConversionFunction::Intrinsic(function),
            });
        }

        if let Some(function) = self.autocasts.find(self.reflection, output, input) {
            return Some(ConversionPlan::RequiresConversionFunction {
                function: ConversionFunction::Library(function),
            });
        }

        if let Some(node) = self.dynamic_cast(output, input) {
            return Some(ConversionPlan::RequiresConversionNode { node });
        }

        self.asset_conversion(output, input)
            .map(|node| ConversionPlan::RequiresConversionNode { node })
    }

    /// Set to array copy, or a scalar wrapped in an array
    fn container_conversion(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> Option<ConversionNode> {
        if !input.is_array() {
            return None;
        }
        let element_context = ResolveContext {
            ignore_container: true,
            ..context.clone()
        };

        match output.container() {
            ContainerShape::Set if !output.is_wildcard() => Some(ConversionNode::SetToArray),
            ContainerShape::None => self
                .are_types_compatible(output, input, &element_context)
                .then_some(ConversionNode::MakeArray),
            _ => None,
        }
    }

    /// Member of the output object whose type declares the called function
    ///
    /// Own fields are visited before inherited ones and the last match wins,
    /// so an ancestor's field shadows a field declared on the output type.
    fn member_fetch(&self, output: &PinType, context: &ResolveContext) -> Option<ConversionNode> {
        let target = context.self_target?;
        if !matches!(output.category(), PinCategory::Object | PinCategory::Interface) {
            return None;
        }
        let oracle = self.oracle();
        let reflection = self.reflection;
        let output_type = self.referenced_type(output, context)?;
        oracle.type_info(target.target_scope)?;

        let mut found = None;
        let mut current = Some(output_type);
        let mut depth = 0;
        while let Some(handle) = current {
            let Some(info) = reflection.type_info(handle) else {
                break;
            };
            for field in &info.fields {
                let Some(field_type) = field.pin_type.sub_category_type() else {
                    continue;
                };
                let is_object = field.pin_type.category() == PinCategory::Object && !field.pin_type.is_container();
                if field.blueprint_visible && is_object && oracle.is_child_of(field_type, target.target_scope) {
                    found = Some(ConversionNode::FetchMember {
                        field: field.name.clone(),
                        field_type,
                    });
                }
            }

            depth += 1;
            if depth > reflection.type_count() {
                break;
            }
            current = info.super_type;
        }
        found
    }

    /// Enum entry name lookup, or a byte cast into an enum
    fn enum_conversion(&self, output: &PinType, input: &PinType) -> Option<ConversionNode> {
        let oracle = self.oracle();

        if output.category() == PinCategory::Byte {
            if let Some(enum_type) = output.sub_category_type().filter(|handle| oracle.is_enum(*handle)) {
                match input.category() {
                    PinCategory::Name => return Some(ConversionNode::EnumToName { enum_type }),
                    PinCategory::String => return Some(ConversionNode::EnumToString { enum_type }),
                    _ => {}
                }
            }

            if input.category() == PinCategory::Byte {
                if let Some(enum_type) = input.sub_category_type().filter(|handle| oracle.is_enum(*handle)) {
                    return Some(ConversionNode::ByteToEnum { enum_type, safe: true });
                }
            }
        }

        None
    }

    /// Conversions to well-known functions outside the autocast table
    fn intrinsic_function(&self, output: &PinType, input: &PinType) -> Option<IntrinsicFunction> {
        let oracle = self.oracle();

        match (output.category(), input.category()) {
            (PinCategory::Interface, PinCategory::Object) => {
                let root = self.reflection.root_object_type()?;
                (input.sub_category_type() == Some(root)).then_some(IntrinsicFunction::InterfaceToObject)
            }
            (PinCategory::Object, PinCategory::Class) => {
                let output_type = self.resolved_sub_type(output)?;
                let input_type = self.resolved_sub_type(input)?;
                oracle
                    .is_child_of(output_type, input_type)
                    .then_some(IntrinsicFunction::GetObjectClass)
            }
            (PinCategory::Object, PinCategory::String) => Some(IntrinsicFunction::ObjectDisplayName),
            (PinCategory::Struct, PinCategory::Struct) => {
                let names = &self.config.well_known_types;
                let output_name = self.reflection.type_name(output.sub_category_type()?)?;
                let input_name = self.reflection.type_name(input.sub_category_type()?)?;
                (output_name == names.rotator && input_name == names.transform)
                    .then_some(IntrinsicFunction::MakeTransform)
            }
            _ => None,
        }
    }

    /// Runtime-checked cast from an interface or a wider object type
    fn dynamic_cast(&self, output: &PinType, input: &PinType) -> Option<ConversionNode> {
        let oracle = self.oracle();
        let output_type = self.resolved_sub_type(output)?;
        let input_type = self.resolved_sub_type(input)?;

        let castable = match (output.category(), input.category()) {
            (PinCategory::Interface, PinCategory::Object) => {
                oracle.implements(input_type, output_type) || oracle.is_child_of(output_type, input_type)
            }
            (PinCategory::Object, PinCategory::Object) => {
                self.config.auto_cast_object_connections && oracle.is_child_of(input_type, output_type)
            }
            _ => false,
        };

        castable.then_some(ConversionNode::DynamicCast { target: input_type })
    }

    /// Soft reference to hard reference and back
    fn asset_conversion(&self, output: &PinType, input: &PinType) -> Option<ConversionNode> {
        let output_type = self.resolved_sub_type(output)?;
        let input_type = self.resolved_sub_type(input)?;
        if !self.oracle().is_child_of(output_type, input_type) {
            return None;
        }

        let convertible = matches!(
            (output.category(), input.category()),
            (PinCategory::SoftObject, PinCategory::Object)
                | (PinCategory::SoftClass, PinCategory::Class)
                | (PinCategory::Object, PinCategory::SoftObject)
                | (PinCategory::Class, PinCategory::SoftClass)
        );
        convertible.then_some(ConversionNode::ConvertAsset {
            from: output.category(),
            to: input.category(),
        })
    }

    fn resolved_sub_type(&self, pin: &PinType) -> Option<TypeHandle> {
        pin.sub_category_type()
            .filter(|handle| self.reflection.type_info(*handle).is_some())
    }
}
