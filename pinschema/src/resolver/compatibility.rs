// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Direct compatibility rules

use super::{PinTypeCompatibilityResolver, ResolveContext};
use crate::types::{PinCategory, PinSubCategory, PinTerminalType, PinType, TypeHandle};

impl<'a> PinTypeCompatibilityResolver<'a> {
    /// Whether `output` can feed `input` without any conversion
    pub fn are_types_compatible(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> bool {
        if !context.ignore_container && output.container() != input.container() {
            let absorbed = (input.is_wildcard() && !input.is_container())
                || (output.is_wildcard() && !output.is_container());
            if !absorbed {
                return false;
            }
        }

        if output.category() == input.category() {
            self.same_category_compatible(output, input, context)
        } else {
            self.cross_category_compatible(output, input, context)
        }
    }

    fn same_category_compatible(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> bool {
        let oracle = self.oracle();

        if output.sub_category() == input.sub_category()
            && output.sub_category_type() == input.sub_category_type()
            && output.signature() == input.signature()
        {
            if input.is_map() && output.is_map() {
                return map_values_compatible(output.value_type(), input.value_type());
            }
            return true;
        }

        match output.category() {
            PinCategory::Interface => {
                let (Some(output_type), Some(input_type)) = (output.sub_category_type(), input.sub_category_type())
                else {
                    self.log_invalid_interfaces(output, input, context);
                    return false;
                };
                if !oracle.is_interface(output_type) || !oracle.is_interface(input_type) {
                    self.log_invalid_interfaces(output, input, context);
                    return false;
                }
                oracle.is_child_of(output_type, input_type)
            }
            PinCategory::SoftObject | PinCategory::SoftClass => {
                match (self.referenced_type(output, context), self.referenced_type(input, context)) {
                    (Some(output_type), Some(input_type)) => oracle.is_child_of(output_type, input_type),
                    _ => false,
                }
            }
            PinCategory::Object | PinCategory::Struct | PinCategory::Class => {
                let (Some(output_type), Some(input_type)) =
                    (self.referenced_type(output, context), self.referenced_type(input, context))
                else {
                    return false;
                };

                if output.category() == PinCategory::Struct {
                    return oracle.is_child_of(output_type, input_type)
                        && oracle.struct_has_same_layout(output_type, input_type);
                }

                // Interface and object references differ in representation
                let input_is_interface = oracle.is_interface(input_type);
                let output_is_interface = oracle.is_interface(output_type);
                match (output_is_interface, input_is_interface) {
                    (false, true) => oracle.implements(output_type, input_type),
                    (true, false) => oracle.implements(input_type, output_type),
                    _ => oracle.is_child_of(output_type, input_type),
                }
            }
            PinCategory::Byte
                if output.sub_category() == input.sub_category() && output.is_bitmask() == input.is_bitmask() =>
            {
                // Enum values may still flow into plain bytes
                input.sub_category_type().is_none()
            }
            // Bitmask integers interoperate with plain integers of the same width
            PinCategory::Byte | PinCategory::Int => output.is_bitmask() || input.is_bitmask(),
            PinCategory::Delegate | PinCategory::MulticastDelegate => {
                let output_function = output.signature().and_then(|handle| oracle.resolve_signature(handle));
                let input_function = input.signature().and_then(|handle| oracle.resolve_signature(handle));
                match (output_function, input_function) {
                    (Some(output_function), Some(input_function)) => {
                        output_function.is_signature_compatible_with(input_function)
                    }
                    _ => true,
                }
            }
            PinCategory::Wildcard => self.wildcard_compatible(output, input),
            _ => false,
        }
    }

    fn cross_category_compatible(&self, output: &PinType, input: &PinType, context: &ResolveContext) -> bool {
        if output.is_wildcard() || input.is_wildcard() {
            return self.wildcard_compatible(output, input);
        }

        if output.category() == PinCategory::Object && input.category() == PinCategory::Interface {
            let oracle = self.oracle();
            let Some(output_type) = self.referenced_type(output, context) else {
                return false;
            };
            let Some(interface) = input.sub_category_type() else {
                return false;
            };
            return oracle.implements(output_type, interface) || oracle.is_child_of(output_type, interface);
        }

        false
    }

    fn wildcard_compatible(&self, output: &PinType, input: &PinType) -> bool {
        if output.is_index_marker() {
            return is_index_compatible(input);
        }
        if input.is_index_marker() {
            return is_index_compatible(output);
        }
        true
    }

    /// Referenced type of a pin, with `self` resolved to the calling context
    ///
    /// `None` when nothing is referenced or the handle no longer resolves.
    pub(crate) fn referenced_type(&self, pin: &PinType, context: &ResolveContext) -> Option<TypeHandle> {
        let handle = match (pin.sub_category(), pin.sub_category_type()) {
            (PinSubCategory::SelfContext, _) => context.calling_context?,
            (_, Some(handle)) => handle,
            _ => return None,
        };
        self.reflection.type_info(handle).map(|_| handle)
    }

    fn log_invalid_interfaces(&self, output: &PinType, input: &PinType, context: &ResolveContext) {
        let name = |handle: Option<TypeHandle>| {
            handle
                .and_then(|handle| self.reflection.type_name(handle))
                .unwrap_or("None")
                .to_string()
        };
        log::error!(
            "Invalid interface types - output: {}, input: {}, calling context: {}",
            name(output.sub_category_type()),
            name(input.sub_category_type()),
            name(context.calling_context)
        );
    }
}

/// Pin types an index wildcard accepts
pub fn is_index_compatible(pin: &PinType) -> bool {
    !pin.is_container()
        && matches!(
            pin.category(),
            PinCategory::Bool | PinCategory::Byte | PinCategory::Int | PinCategory::Enum | PinCategory::Wildcard
        )
}

fn map_values_compatible(output: Option<&PinTerminalType>, input: Option<&PinTerminalType>) -> bool {
    match (output, input) {
        (Some(output), Some(input)) => output.is_wildcard() || input.is_wildcard() || output == input,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocast::AutocastFunctionRegistry;
    use crate::config::ResolverConfig;
    use crate::reflection::TypeRegistry;

    fn compatible(registry: &TypeRegistry, output: &PinType, input: &PinType) -> bool {
        let autocasts = AutocastFunctionRegistry::default();
        let config = ResolverConfig::default();
        let resolver = PinTypeCompatibilityResolver::new(registry, &autocasts, &config);
        resolver.are_types_compatible(output, input, &ResolveContext::default())
    }

    #[test]
    fn test_map_value_types() {
        let registry = TypeRegistry::new();
        let name_to_int = PinType::new(PinCategory::Name).as_map(PinTerminalType::new(PinCategory::Int));
        let name_to_float = PinType::new(PinCategory::Name).as_map(PinTerminalType::new(PinCategory::Float));
        let name_to_any = PinType::new(PinCategory::Name).as_map(PinTerminalType::new(PinCategory::Wildcard));

        assert!(compatible(&registry, &name_to_int, &name_to_int));
        assert!(!compatible(&registry, &name_to_int, &name_to_float));
        assert!(compatible(&registry, &name_to_int, &name_to_any));
    }

    #[test]
    fn test_bitmask_integers() {
        let registry = TypeRegistry::new();
        let int = PinType::new(PinCategory::Int);
        assert!(compatible(&registry, &int.clone().bitmask(), &int));
        assert!(compatible(&registry, &int, &int.clone().bitmask()));
    }

    #[test]
    fn test_enum_byte_flows_into_plain_byte() {
        let mut registry = TypeRegistry::new();
        let color = registry.add_enum("EColor", vec!["Red".into()]).unwrap();
        let size = registry.add_enum("ESize", vec!["Small".into()]).unwrap();
        let byte = PinType::new(PinCategory::Byte);

        assert!(compatible(&registry, &PinType::of(PinCategory::Byte, color), &byte));
        assert!(!compatible(&registry, &byte, &PinType::of(PinCategory::Byte, color)));
        assert!(!compatible(
            &registry,
            &PinType::of(PinCategory::Byte, color),
            &PinType::of(PinCategory::Byte, size)
        ));
    }

    #[test]
    fn test_index_wildcard() {
        let registry = TypeRegistry::new();
        let index = PinType::wildcard().with_sub_category(PinSubCategory::Index);

        assert!(compatible(&registry, &PinType::new(PinCategory::Int), &index));
        assert!(compatible(&registry, &index, &PinType::new(PinCategory::Bool)));
        assert!(compatible(&registry, &PinType::wildcard(), &index));
        assert!(!compatible(&registry, &PinType::new(PinCategory::Float), &index));
        assert!(!compatible(&registry, &PinType::new(PinCategory::Int).as_array(), &index));
    }

    #[test]
    fn test_invalid_interface_descriptors() {
        let mut registry = TypeRegistry::new();
        let actor = registry.add_class("Actor", None).unwrap();
        let iface = registry.add_interface("IUsable", None).unwrap();

        assert!(!compatible(
            &registry,
            &PinType::of(PinCategory::Interface, actor),
            &PinType::of(PinCategory::Interface, iface)
        ));
        assert!(compatible(
            &registry,
            &PinType::of(PinCategory::Interface, iface),
            &PinType::of(PinCategory::Interface, iface)
        ));
    }

    #[test]
    fn test_self_resolves_to_calling_context() {
        let mut registry = TypeRegistry::new();
        let actor = registry.add_class("Actor", None).unwrap();
        let pawn = registry.add_class("Pawn", Some(actor)).unwrap();
        let autocasts = AutocastFunctionRegistry::default();
        let config = ResolverConfig::default();
        let resolver = PinTypeCompatibilityResolver::new(&registry, &autocasts, &config);

        let self_pin = PinType::new(PinCategory::Object).with_sub_category(PinSubCategory::SelfContext);
        let actor_pin = PinType::of(PinCategory::Object, actor);
        let context = ResolveContext::default().with_calling_context(pawn);

        assert!(resolver.are_types_compatible(&self_pin, &actor_pin, &context));
        assert!(!resolver.are_types_compatible(&self_pin, &actor_pin, &ResolveContext::default()));
    }
}
