// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! PinSchema - pin type compatibility for visual scripting graphs
//!
//! PinSchema decides whether an output pin of a node graph may be wired to an
//! input pin, and if not directly, which conversion bridges the two.
//!
//! # Features
//!
//! - **Type Categories**: Fixed table of pin categories with display names
//! - **Subtype Oracle**: Regeneration-aware class, struct and interface checks
//! - **Autocast Table**: Conversion functions discovered from function libraries
//! - **Conversion Search**: Container, enum, member, cast and asset conversions
//! - **Connection Policy**: Link responses for concrete pins on graph nodes
//! - **Catalogs**: JSON type catalogs with a compact pin type expression syntax
//!
//! # Usage
//!
//! ```bash
//! # Resolve a connection against a catalog
//! pinschema resolve "int" "float" --catalog ./types.json
//!
//! # List discovered autocast functions
//! pinschema autocasts --catalog ./types.json
//! ```

pub mod autocast;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod reflection;
pub mod resolver;
pub mod types;

pub use autocast::{AutocastFunctionRegistry, ModuleEvent, ModuleEventHub};
pub use catalog::{load_catalog, load_catalog_str, parse_pin_type, CatalogError, CatalogFile, CatalogResult};
pub use config::{DuplicatePolicy, ResolverConfig};
pub use connection::{ConnectionPolicy, ConnectionResponse, ConnectionResponseKind, GraphPin, NodeDescriptor, NodeId};
pub use reflection::{ReflectionService, SubtypeHierarchyOracle, TypeRegistry};
pub use resolver::{
    ConversionFunction, ConversionNode, ConversionPlan, Incompatibility, PinTypeCompatibilityResolver, ResolveContext,
};
pub use types::{type_to_text, PinCategory, PinSubCategory, PinType, TypeCategoryTable};

/// PinSchema version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// PinSchema crate name
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
