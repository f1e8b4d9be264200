//! Standard type registry fixture
//!
//! Hierarchy:
//! - `Object` (root) <- `Actor` <- `MyActor` (implements `IInteractable`)
//! - `Object` <- `MovementComponent`, `Object` <- `Character` (field `Movement`)
//! - `Object` <- `MyAsset` <- `Texture`
//! - structs `Vector`, `Rotator`, `Transform`, and `DerivedVector` (derives
//!   from `Vector` without adding fields)
//! - enum `EColor`
//! - function libraries `MathLibrary` (Int -> Float, Int -> String) and
//!   `StringLibrary` (Name -> String)

#![allow(dead_code)]

use pinschema::autocast::AutocastFunctionRegistry;
use pinschema::catalog::load_catalog_str;
use pinschema::config::ResolverConfig;
use pinschema::reflection::{FieldInfo, FunctionInfo, ReflectionService, TypeRegistry};
use pinschema::resolver::{ConversionPlan, PinTypeCompatibilityResolver, ResolveContext};
use pinschema::types::{PinCategory, PinType, TypeHandle};

/// JSON form of the standard registry
pub const STANDARD_CATALOG: &str = include_str!("../fixtures/standard_catalog.json");

/// Handles of the standard types
#[derive(Debug, Clone, Copy)]
pub struct StandardTypes {
    pub object: TypeHandle,
    pub actor: TypeHandle,
    pub my_actor: TypeHandle,
    pub interactable: TypeHandle,
    pub movement: TypeHandle,
    pub character: TypeHandle,
    pub my_asset: TypeHandle,
    pub texture: TypeHandle,
    pub vector: TypeHandle,
    pub rotator: TypeHandle,
    pub transform: TypeHandle,
    pub derived_vector: TypeHandle,
    pub color: TypeHandle,
    pub math_library: TypeHandle,
}

impl StandardTypes {
    /// Look up every standard type by name
    pub fn lookup(registry: &TypeRegistry) -> Self {
        let find = |name: &str| {
            registry
                .find_type(name)
                .unwrap_or_else(|| panic!("standard type {} missing", name))
        };
        Self {
            object: find("Object"),
            actor: find("Actor"),
            my_actor: find("MyActor"),
            interactable: find("IInteractable"),
            movement: find("MovementComponent"),
            character: find("Character"),
            my_asset: find("MyAsset"),
            texture: find("Texture"),
            vector: find("Vector"),
            rotator: find("Rotator"),
            transform: find("Transform"),
            derived_vector: find("DerivedVector"),
            color: find("EColor"),
            math_library: find("MathLibrary"),
        }
    }
}

/// Registry, autocast table and configuration for resolver tests
pub struct TypeFixture {
    pub registry: TypeRegistry,
    pub autocasts: AutocastFunctionRegistry,
    pub config: ResolverConfig,
    pub types: StandardTypes,
}

impl TypeFixture {
    /// Standard registry with numeric autocasts available
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Standard registry whose math library has no Int -> Float conversion
    pub fn without_numeric_casts() -> Self {
        Self::build(false)
    }

    /// Standard registry loaded from the JSON catalog
    pub fn from_catalog() -> Self {
        let registry = load_catalog_str(STANDARD_CATALOG).expect("Failed to load standard catalog");
        Self::with_registry(registry)
    }

    pub fn with_registry(registry: TypeRegistry) -> Self {
        let types = StandardTypes::lookup(&registry);
        Self {
            registry,
            autocasts: AutocastFunctionRegistry::default(),
            config: ResolverConfig::default(),
            types,
        }
    }

    fn build(numeric_casts: bool) -> Self {
        let mut registry = TypeRegistry::new();

        let object = registry.add_class("Object", None).unwrap();
        registry.set_root_object(object);
        let actor = registry.add_class("Actor", Some(object)).unwrap();
        let interactable = registry.add_interface("IInteractable", None).unwrap();
        let my_actor = registry.add_class("MyActor", Some(actor)).unwrap();
        registry.add_interface_impl(my_actor, interactable).unwrap();

        let movement = registry.add_class("MovementComponent", Some(object)).unwrap();
        let character = registry.add_class("Character", Some(actor)).unwrap();
        registry
            .add_field(character, FieldInfo::new("Movement", PinType::of(PinCategory::Object, movement)))
            .unwrap();

        let my_asset = registry.add_class("MyAsset", Some(object)).unwrap();
        registry.add_class("Texture", Some(my_asset)).unwrap();

        let float = || PinType::new(PinCategory::Float);
        let vector = registry
            .add_struct(
                "Vector",
                None,
                vec![
                    FieldInfo::new("X", float()),
                    FieldInfo::new("Y", float()),
                    FieldInfo::new("Z", float()),
                ],
            )
            .unwrap();
        let rotator = registry
            .add_struct(
                "Rotator",
                None,
                vec![
                    FieldInfo::new("Pitch", float()),
                    FieldInfo::new("Yaw", float()),
                    FieldInfo::new("Roll", float()),
                ],
            )
            .unwrap();
        registry
            .add_struct(
                "Transform",
                None,
                vec![
                    FieldInfo::new("Rotation", PinType::of(PinCategory::Struct, rotator)),
                    FieldInfo::new("Translation", PinType::of(PinCategory::Struct, vector)),
                ],
            )
            .unwrap();
        registry.add_struct("DerivedVector", Some(vector), Vec::new()).unwrap();

        registry
            .add_enum("EColor", vec!["Red".to_string(), "Green".to_string(), "Blue".to_string()])
            .unwrap();

        let math = registry.add_function_library("MathLibrary").unwrap();
        if numeric_casts {
            registry
                .add_function(
                    math,
                    FunctionInfo::autocast("Conv_IntToFloat", PinType::new(PinCategory::Int), float()),
                )
                .unwrap();
        }
        registry
            .add_function(
                math,
                FunctionInfo::autocast(
                    "Conv_IntToString",
                    PinType::new(PinCategory::Int),
                    PinType::new(PinCategory::String),
                ),
            )
            .unwrap();

        let strings = registry.add_function_library("StringLibrary").unwrap();
        registry
            .add_function(
                strings,
                FunctionInfo::autocast(
                    "Conv_NameToString",
                    PinType::new(PinCategory::Name),
                    PinType::new(PinCategory::String),
                ),
            )
            .unwrap();

        Self::with_registry(registry)
    }

    pub fn resolver(&self) -> PinTypeCompatibilityResolver<'_> {
        PinTypeCompatibilityResolver::new(&self.registry, &self.autocasts, &self.config)
    }

    /// Resolve with a default context
    pub fn resolve(&self, output: &PinType, input: &PinType) -> ConversionPlan {
        self.resolver().resolve(output, input, &ResolveContext::default())
    }

    pub fn object(&self, handle: TypeHandle) -> PinType {
        PinType::of(PinCategory::Object, handle)
    }

    pub fn structure(&self, handle: TypeHandle) -> PinType {
        PinType::of(PinCategory::Struct, handle)
    }

    /// Function handle of a library function by name
    pub fn function(&self, owner: TypeHandle, name: &str) -> pinschema::types::FunctionHandle {
        self.registry
            .find_function(owner, name)
            .unwrap_or_else(|| panic!("function {} missing", name))
    }

    /// Assert `output` resolves to a conversion against `input` and return it
    pub fn assert_converts(&self, output: &PinType, input: &PinType) -> ConversionPlan {
        let plan = self.resolve(output, input);
        assert!(
            plan.requires_conversion(),
            "Expected a conversion from {:?} to {:?}, got {:?}",
            output,
            input,
            plan
        );
        plan
    }

    /// Assert `output` cannot feed `input` and return the diagnosis severity
    pub fn assert_incompatible(&self, output: &PinType, input: &PinType) -> bool {
        match self.resolve(output, input) {
            ConversionPlan::Incompatible(incompatibility) => incompatibility.is_fatal,
            plan => panic!("Expected {:?} -> {:?} to be incompatible, got {:?}", output, input, plan),
        }
    }
}

impl Default for TypeFixture {
    fn default() -> Self {
        Self::new()
    }
}
