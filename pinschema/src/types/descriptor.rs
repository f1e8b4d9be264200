// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pin type descriptors
//!
//! A `PinType` is an immutable value: it is built once through the
//! constructor/builder methods below and never mutated afterwards. The only
//! structural invariant is that a value type is present exactly when the
//! container shape is `Map`; the builders assert it, and deserialization
//! rejects descriptors that break it.

use serde::{Deserialize, Serialize};

use super::category::PinCategory;
use super::handle::{FunctionHandle, TypeHandle};
use super::{TypeError, TypeResult};

/// Special sub-category markers
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PinSubCategory {
    #[default]
    None,
    /// Resolves to the calling context type
    SelfContext,
    /// Wildcard that only accepts indexable types
    Index,
    /// Any other free-form tag
    Tag(String),
}

impl PinSubCategory {
    pub fn is_none(&self) -> bool {
        matches!(self, PinSubCategory::None)
    }

    pub fn as_str(&self) -> &str {
        match self {
            PinSubCategory::None => "",
            PinSubCategory::SelfContext => "self",
            PinSubCategory::Index => "index",
            PinSubCategory::Tag(tag) => tag,
        }
    }
}

/// Container shape of a pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerShape {
    #[default]
    None,
    Array,
    Set,
    Map,
}

/// Non-container part of a pin type; also the value type of a map
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PinTerminalType {
    pub category: PinCategory,
    #[serde(default)]
    pub sub_category: PinSubCategory,
    #[serde(default)]
    pub sub_category_type: Option<TypeHandle>,
    #[serde(default)]
    pub is_weak_pointer: bool,
    #[serde(default)]
    pub is_bitmask: bool,
}

impl PinTerminalType {
    pub fn new(category: PinCategory) -> Self {
        Self {
            category,
            sub_category: PinSubCategory::None,
            sub_category_type: None,
            is_weak_pointer: false,
            is_bitmask: false,
        }
    }

    pub fn of(category: PinCategory, sub_type: TypeHandle) -> Self {
        Self::new(category).with_sub_type(sub_type)
    }

    pub fn with_sub_type(mut self, sub_type: TypeHandle) -> Self {
        self.sub_category_type = Some(sub_type);
        self
    }

    pub fn with_sub_category(mut self, sub_category: PinSubCategory) -> Self {
        self.sub_category = sub_category;
        self
    }

    pub fn is_wildcard(&self) -> bool {
        self.category == PinCategory::Wildcard
    }
}

/// Full pin type descriptor
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PinTypeRepr")]
pub struct PinType {
    category: PinCategory,
    sub_category: PinSubCategory,
    sub_category_type: Option<TypeHandle>,
    signature: Option<FunctionHandle>,
    container: ContainerShape,
    value_type: Option<PinTerminalType>,
    is_reference: bool,
    is_const: bool,
    is_weak_pointer: bool,
    is_bitmask: bool,
}

impl PinType {
    /// Scalar pin of the given category
    pub fn new(category: PinCategory) -> Self {
        Self {
            category,
            sub_category: PinSubCategory::None,
            sub_category_type: None,
            signature: None,
            container: ContainerShape::None,
            value_type: None,
            is_reference: false,
            is_const: false,
            is_weak_pointer: false,
            is_bitmask: false,
        }
    }

    /// Scalar pin of the given category referencing a type
    pub fn of(category: PinCategory, sub_type: TypeHandle) -> Self {
        Self::new(category).with_sub_type(sub_type)
    }

    pub fn wildcard() -> Self {
        Self::new(PinCategory::Wildcard)
    }

    pub fn exec() -> Self {
        Self::new(PinCategory::Exec)
    }

    pub fn from_terminal(terminal: &PinTerminalType) -> Self {
        let mut pin = Self::new(terminal.category);
        pin.sub_category = terminal.sub_category.clone();
        pin.sub_category_type = terminal.sub_category_type;
        pin.is_weak_pointer = terminal.is_weak_pointer;
        pin.is_bitmask = terminal.is_bitmask;
        pin
    }

    pub fn with_sub_category(mut self, sub_category: PinSubCategory) -> Self {
        self.sub_category = sub_category;
        self
    }

    pub fn with_sub_type(mut self, sub_type: TypeHandle) -> Self {
        self.sub_category_type = Some(sub_type);
        self
    }

    /// Delegate signature function
    pub fn with_signature(mut self, signature: FunctionHandle) -> Self {
        self.signature = Some(signature);
        self
    }

    pub fn as_array(self) -> Self {
        self.with_container(ContainerShape::Array, None)
    }

    pub fn as_set(self) -> Self {
        self.with_container(ContainerShape::Set, None)
    }

    pub fn as_map(self, value_type: PinTerminalType) -> Self {
        self.with_container(ContainerShape::Map, Some(value_type))
    }

    /// Set the container shape
    ///
    /// # Panics
    /// When `value_type` is present for a non-map shape or missing for a map.
    pub fn with_container(mut self, shape: ContainerShape, value_type: Option<PinTerminalType>) -> Self {
        assert_eq!(
            shape == ContainerShape::Map,
            value_type.is_some(),
            "map pin types carry a value type and nothing else does"
        );
        self.container = shape;
        self.value_type = value_type;
        self
    }

    pub fn by_ref(mut self) -> Self {
        self.is_reference = true;
        self
    }

    pub fn as_const(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn weak(mut self) -> Self {
        self.is_weak_pointer = true;
        self
    }

    pub fn bitmask(mut self) -> Self {
        self.is_bitmask = true;
        self
    }

    pub fn category(&self) -> PinCategory {
        self.category
    }

    pub fn sub_category(&self) -> &PinSubCategory {
        &self.sub_category
    }

    pub fn sub_category_type(&self) -> Option<TypeHandle> {
        self.sub_category_type
    }

    pub fn signature(&self) -> Option<FunctionHandle> {
        self.signature
    }

    pub fn container(&self) -> ContainerShape {
        self.container
    }

    pub fn value_type(&self) -> Option<&PinTerminalType> {
        self.value_type.as_ref()
    }

    pub fn is_reference(&self) -> bool {
        self.is_reference
    }

    pub fn is_const(&self) -> bool {
        self.is_const
    }

    pub fn is_weak_pointer(&self) -> bool {
        self.is_weak_pointer
    }

    pub fn is_bitmask(&self) -> bool {
        self.is_bitmask
    }

    pub fn is_container(&self) -> bool {
        self.container != ContainerShape::None
    }

    pub fn is_array(&self) -> bool {
        self.container == ContainerShape::Array
    }

    pub fn is_set(&self) -> bool {
        self.container == ContainerShape::Set
    }

    pub fn is_map(&self) -> bool {
        self.container == ContainerShape::Map
    }

    pub fn is_wildcard(&self) -> bool {
        self.category == PinCategory::Wildcard
    }

    pub fn is_exec(&self) -> bool {
        self.category == PinCategory::Exec
    }

    pub fn is_self_context(&self) -> bool {
        self.sub_category == PinSubCategory::SelfContext
    }

    pub fn is_index_marker(&self) -> bool {
        self.sub_category == PinSubCategory::Index
    }

    /// Key/element part of the descriptor
    pub fn terminal(&self) -> PinTerminalType {
        PinTerminalType {
            category: self.category,
            sub_category: self.sub_category.clone(),
            sub_category_type: self.sub_category_type,
            is_weak_pointer: self.is_weak_pointer,
            is_bitmask: self.is_bitmask,
        }
    }

    /// Same descriptor with the container shape stripped
    pub fn element(&self) -> PinType {
        let mut element = self.clone();
        element.container = ContainerShape::None;
        element.value_type = None;
        element
    }

    /// Check the map/value-type invariant
    pub fn validate(&self) -> TypeResult<()> {
        if self.is_map() != self.value_type.is_some() {
            return Err(TypeError::InvalidTypeSpecification(format!(
                "{} pin with container {:?} {} a value type",
                self.category,
                self.container,
                if self.value_type.is_some() {
                    "must not carry"
                } else {
                    "requires"
                }
            )));
        }
        Ok(())
    }
}

/// Wire form of `PinType`, validated on the way in
#[derive(Debug, Deserialize)]
struct PinTypeRepr {
    category: PinCategory,
    #[serde(default)]
    sub_category: PinSubCategory,
    #[serde(default)]
    sub_category_type: Option<TypeHandle>,
    #[serde(default)]
    signature: Option<FunctionHandle>,
    #[serde(default)]
    container: ContainerShape,
    #[serde(default)]
    value_type: Option<PinTerminalType>,
    #[serde(default)]
    is_reference: bool,
    #[serde(default)]
    is_const: bool,
    #[serde(default)]
    is_weak_pointer: bool,
    #[serde(default)]
    is_bitmask: bool,
}

impl TryFrom<PinTypeRepr> for PinType {
    type Error = TypeError;

    fn try_from(repr: PinTypeRepr) -> Result<Self, Self::Error> {
        let pin = PinType {
            category: repr.category,
            sub_category: repr.sub_category,
            sub_category_type: repr.sub_category_type,
            signature: repr.signature,
            container: repr.container,
            value_type: repr.value_type,
            is_reference: repr.is_reference,
            is_const: repr.is_const,
            is_weak_pointer: repr.is_weak_pointer,
            is_bitmask: repr.is_bitmask,
        };
        pin.validate()?;
        Ok(pin)
    }
}

/// Direction of a pin on its node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    Input,
    Output,
}

/// A pin type paired with the direction it faces
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionEndpoint {
    pub pin_type: PinType,
    pub direction: PinDirection,
}

impl ConnectionEndpoint {
    pub fn output(pin_type: PinType) -> Self {
        Self {
            pin_type,
            direction: PinDirection::Output,
        }
    }

    pub fn input(pin_type: PinType) -> Self {
        Self {
            pin_type,
            direction: PinDirection::Input,
        }
    }
}
