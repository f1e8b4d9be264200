//! Autocast registry tests
//!
//! Rebuild determinism, event-driven invalidation, duplicate handling and
//! candidate filtering.

#[path = "testutils/mod.rs"]
mod testutils;

use std::sync::Arc;

use pinschema::autocast::{AutocastError, AutocastFunctionRegistry, ModuleEvent, ModuleEventHub};
use pinschema::config::DuplicatePolicy;
use pinschema::reflection::{FunctionFlags, FunctionInfo, TypeFlags};
use pinschema::types::{PinCategory, PinType};
use testutils::type_fixture::TypeFixture;

fn int() -> PinType {
    PinType::new(PinCategory::Int)
}

fn float() -> PinType {
    PinType::new(PinCategory::Float)
}

fn text() -> PinType {
    PinType::new(PinCategory::Text)
}

#[test]
fn test_rebuild_is_deterministic() {
    let fixture = TypeFixture::new();
    let autocasts = AutocastFunctionRegistry::default();
    let pairs = vec![
        (int(), float()),
        (int(), PinType::new(PinCategory::String)),
        (PinType::new(PinCategory::Name), PinType::new(PinCategory::String)),
        (float(), int()),
    ];

    let first_stats = autocasts.rebuild(&fixture.registry).unwrap();
    let first_entries = autocasts.entries();
    let first: Vec<_> = pairs
        .iter()
        .map(|(output, input)| autocasts.find(&fixture.registry, output, input))
        .collect();

    let second_stats = autocasts.rebuild(&fixture.registry).unwrap();
    let second: Vec<_> = pairs
        .iter()
        .map(|(output, input)| autocasts.find(&fixture.registry, output, input))
        .collect();

    assert_eq!(first_stats, second_stats);
    assert_eq!(first_entries, autocasts.entries());
    assert_eq!(first, second);
    assert_eq!(first_stats.libraries_scanned, 2);
    assert_eq!(first_stats.functions_indexed, 3);
    assert_eq!(first[3], None);
}

#[test]
fn test_module_events_invalidate_the_table() {
    let mut fixture = TypeFixture::new();
    let hub = ModuleEventHub::new();
    let autocasts = Arc::new(AutocastFunctionRegistry::default());
    hub.subscribe(autocasts.clone());

    assert!(autocasts.find(&fixture.registry, &int(), &float()).is_some());
    assert_eq!(autocasts.generation(), 1);

    let library = fixture.types.math_library;
    let added = fixture
        .registry
        .add_function(library, FunctionInfo::autocast("Conv_IntToText", int(), text()))
        .unwrap();

    // Not visible until the host reports the change
    assert_eq!(autocasts.find(&fixture.registry, &int(), &text()), None);

    hub.publish(&ModuleEvent::Loaded("TextModule".to_string()));
    assert!(autocasts.is_stale());
    assert_eq!(autocasts.find(&fixture.registry, &int(), &text()), Some(added));
    assert_eq!(autocasts.generation(), 2);
}

#[test]
fn test_duplicate_signatures_last_wins() {
    let mut fixture = TypeFixture::new();
    let extra = fixture.registry.add_function_library("ExtraMathLibrary").unwrap();
    let replacement = fixture
        .registry
        .add_function(extra, FunctionInfo::autocast("Conv_IntToFloatFast", int(), float()))
        .unwrap();

    let autocasts = AutocastFunctionRegistry::new(DuplicatePolicy::LastWins);
    let stats = autocasts.rebuild(&fixture.registry).unwrap();
    assert_eq!(stats.duplicates_replaced, 1);
    assert_eq!(autocasts.find(&fixture.registry, &int(), &float()), Some(replacement));
}

#[test]
fn test_duplicate_signatures_rejected() {
    let mut fixture = TypeFixture::new();
    let extra = fixture.registry.add_function_library("ExtraMathLibrary").unwrap();
    fixture
        .registry
        .add_function(extra, FunctionInfo::autocast("Conv_IntToFloatFast", int(), float()))
        .unwrap();

    let autocasts = AutocastFunctionRegistry::new(DuplicatePolicy::Reject);
    match autocasts.rebuild(&fixture.registry) {
        Err(AutocastError::DuplicateSignature { first, second, .. }) => {
            assert!(first.ends_with("Conv_IntToFloat"));
            assert!(second.ends_with("Conv_IntToFloatFast"));
        }
        other => panic!("Expected a duplicate signature error, got {:?}", other),
    }
    // The failed rebuild leaves an empty table behind
    assert_eq!(autocasts.find(&fixture.registry, &int(), &float()), None);
}

#[test]
fn test_ineligible_candidates_are_skipped() {
    let mut fixture = TypeFixture::without_numeric_casts();
    let library = fixture.types.math_library;

    let mut deprecated = FunctionInfo::autocast("Conv_IntToFloat", int(), float());
    deprecated.is_deprecated = true;
    fixture.registry.add_function(library, deprecated).unwrap();

    let mut impure = FunctionInfo::autocast("Conv_IntToText", int(), text());
    impure.flags = FunctionFlags {
        is_pure: false,
        ..FunctionFlags::pure_static()
    };
    fixture.registry.add_function(library, impure).unwrap();

    let autocasts = AutocastFunctionRegistry::default();
    assert_eq!(autocasts.find(&fixture.registry, &int(), &float()), None);
    assert_eq!(autocasts.find(&fixture.registry, &int(), &text()), None);
}

#[test]
fn test_superseded_libraries_are_not_scanned() {
    let mut fixture = TypeFixture::new();
    let flags = TypeFlags {
        newer_version_exists: true,
        ..TypeFlags::default()
    };
    fixture.registry.set_flags(fixture.types.math_library, flags).unwrap();

    let autocasts = AutocastFunctionRegistry::default();
    let stats = autocasts.rebuild(&fixture.registry).unwrap();
    assert_eq!(stats.libraries_scanned, 1);
    assert_eq!(autocasts.find(&fixture.registry, &int(), &float()), None);
}

#[test]
fn test_container_types_never_autocast() {
    let fixture = TypeFixture::new();
    let autocasts = AutocastFunctionRegistry::default();
    assert_eq!(
        autocasts.find(&fixture.registry, &int().as_array(), &float().as_array()),
        None
    );
}

#[test]
fn test_removed_functions_are_not_returned() {
    let mut fixture = TypeFixture::new();
    let autocasts = AutocastFunctionRegistry::default();
    assert!(autocasts.find(&fixture.registry, &int(), &float()).is_some());

    fixture.registry.remove_type(fixture.types.math_library);
    assert_eq!(autocasts.find(&fixture.registry, &int(), &float()), None);
}
