// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Diagnostics for pin types that cannot be connected

use super::{Incompatibility, PinTypeCompatibilityResolver};
use crate::types::{type_to_text, PinCategory, PinType};

/// Display names of the two pins in the order the user connected them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinLabels<'l> {
    pub first: &'l str,
    pub second: &'l str,
    /// The first pin is the output
    pub first_is_output: bool,
}

impl<'a> PinTypeCompatibilityResolver<'a> {
    /// Reason and severity for `output` not being able to feed `input`
    ///
    /// Without labels the pins are named by their type text.
    pub fn diagnose(&self, output: &PinType, input: &PinType, labels: Option<PinLabels<'_>>) -> Incompatibility {
        let output_text = type_to_text(output, self.reflection);
        let input_text = type_to_text(input, self.reflection);
        let labels = labels.unwrap_or(PinLabels {
            first: &output_text,
            second: &input_text,
            first_is_output: true,
        });
        let (output_name, input_name) = if labels.first_is_output {
            (labels.first, labels.second)
        } else {
            (labels.second, labels.first)
        };
        let (first_text, second_text) = if labels.first_is_output {
            (&output_text, &input_text)
        } else {
            (&input_text, &output_text)
        };

        let mut reason = format!("{} is not compatible with {}.", first_text, second_text);
        let mut is_fatal = self.is_fatal_by_default(output, input);

        match (output.category(), input.category()) {
            (PinCategory::Struct, PinCategory::Struct) => {
                reason = "Only exactly matching structures are considered compatible.".to_string();
                let derived = match (output.sub_category_type(), input.sub_category_type()) {
                    (Some(output_type), Some(input_type)) => self.oracle().is_child_of(output_type, input_type),
                    _ => false,
                };
                if derived {
                    reason.push_str(" Derived structures are disallowed.");
                }
            }
            (PinCategory::Class, PinCategory::Object | PinCategory::Interface) => {
                reason = format!(
                    "'{}' and '{}' are incompatible ('{}' is an object type, and '{}' is a reference to an object instance).",
                    labels.first, labels.second, output_name, input_name
                );
                // A class is itself an object
                if input.category() == PinCategory::Object {
                    is_fatal = false;
                }
            }
            (PinCategory::Object, PinCategory::Class) => {
                reason = format!(
                    "'{}' and '{}' are not inherently compatible ('{}' is an object type, and '{}' is a reference to an object instance).\nWe cannot use {}'s class because it is not a child of {}.",
                    labels.first, labels.second, input_name, output_name, output_name, input_text
                );
            }
            _ => {}
        }

        Incompatibility { reason, is_fatal }
    }

    /// Severity before the category-specific adjustments
    fn is_fatal_by_default(&self, output: &PinType, input: &PinType) -> bool {
        if output.container() != input.container() {
            return false;
        }

        let dangling = |pin: &PinType| {
            pin.sub_category_type()
                .map(|handle| self.reflection.type_info(handle).is_none())
                .unwrap_or(false)
        };
        if dangling(output) || dangling(input) {
            return false;
        }

        if output.category() == input.category() {
            return matches!(
                output.category(),
                PinCategory::Interface
                    | PinCategory::SoftObject
                    | PinCategory::SoftClass
                    | PinCategory::Object
                    | PinCategory::Struct
                    | PinCategory::Class
                    | PinCategory::Byte
                    | PinCategory::Int
                    | PinCategory::Delegate
                    | PinCategory::MulticastDelegate
            );
        }

        true
    }
}
