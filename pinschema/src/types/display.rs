// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Human-readable pin type text for tooltips and diagnostics

use crate::reflection::ReflectionService;
use crate::types::{ContainerShape, PinCategory, PinSubCategory, PinTerminalType, PinType};

/// Struct names shown without their category suffix
const WELL_KNOWN_STRUCTS: [&str; 3] = ["Vector", "Rotator", "Transform"];

/// Render the non-container part of a pin type
pub fn terminal_type_to_text(terminal: &PinTerminalType, reflection: &dyn ReflectionService) -> String {
    let category = terminal.category;
    let referenced = terminal
        .sub_category_type
        .and_then(|handle| reflection.type_info(handle));

    if let (false, Some(info)) = (terminal.is_bitmask, referenced) {
        if category == PinCategory::Byte {
            return format!("{} Enum", info.name);
        }

        if terminal.is_weak_pointer {
            return format!("{} Weak {}", info.name, category.as_str());
        }

        if category == PinCategory::Struct && WELL_KNOWN_STRUCTS.contains(&info.name.as_str()) {
            return info.name.clone();
        }

        let category_text = if info.is_interface() {
            PinCategory::Interface.display_name()
        } else {
            category.display_name()
        };
        return format!("{} {}", info.name, category_text);
    }

    if terminal.is_bitmask {
        return format!("Bitmask {}", category.display_name());
    }

    match &terminal.sub_category {
        PinSubCategory::None => category.display_name().to_string(),
        other => format!("{} {}", capitalize(other.as_str()), category.display_name()),
    }
}

/// Render a full pin type, including its container shape
pub fn type_to_text(pin: &PinType, reflection: &dyn ReflectionService) -> String {
    let text = terminal_type_to_text(&pin.terminal(), reflection);

    match pin.container() {
        ContainerShape::Map => {
            let value_text = pin
                .value_type()
                .map(|value| terminal_type_to_text(value, reflection))
                .unwrap_or_default();
            format!("Map of {}s to {}s", text, value_text)
        }
        ContainerShape::Set => format!("Set of {}s", text),
        ContainerShape::Array => format!("Array of {}s", text),
        ContainerShape::None if pin.is_reference() => format!("{} (by ref)", text),
        ContainerShape::None => text,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
