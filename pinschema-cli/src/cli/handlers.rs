// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! CLI command handlers for PinSchema

use std::path::PathBuf;

use super::commands::OutputFormat;
use super::output::ResultFormatter;
use pinschema::{
    load_catalog, parse_pin_type, AutocastFunctionRegistry, PinTypeCompatibilityResolver, ReflectionService,
    ResolveContext, ResolverConfig, TypeRegistry,
};

/// Handle the resolve command
pub fn handle_resolve(
    catalog: PathBuf,
    config: Option<PathBuf>,
    output: String,
    input: String,
    context: Option<String>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_catalog(&catalog).map_err(|e| format!("Failed to load catalog: {}", e))?;
    let config = load_config(config)?;
    let autocasts = AutocastFunctionRegistry::new(config.duplicate_autocast_policy);

    let output_type = parse_pin_type(&output, &registry)?;
    let input_type = parse_pin_type(&input, &registry)?;

    let resolve_context = calling_context(&registry, context.as_deref())?;

    let resolver = PinTypeCompatibilityResolver::new(&registry, &autocasts, &config);
    let plan = resolver.resolve(&output_type, &input_type, &resolve_context);
    log::debug!("Resolved {} -> {}: {:?}", output, input, plan);

    print!(
        "{}",
        ResultFormatter::format_plan(&registry, &output_type, &input_type, &plan, format)
    );
    Ok(())
}

/// Handle the autocasts command
pub fn handle_autocasts(
    catalog: PathBuf,
    config: Option<PathBuf>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let registry = load_catalog(&catalog).map_err(|e| format!("Failed to load catalog: {}", e))?;
    let config = load_config(config)?;
    let autocasts = AutocastFunctionRegistry::new(config.duplicate_autocast_policy);

    let stats = autocasts.rebuild(&registry)?;
    log::debug!(
        "Scanned {} libraries, indexed {} functions",
        stats.libraries_scanned,
        stats.functions_indexed
    );

    print!("{}", ResultFormatter::format_autocasts(&registry, &autocasts, format));
    Ok(())
}

/// Handle the categories command
pub fn handle_categories(format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    print!("{}", ResultFormatter::format_categories(format));
    Ok(())
}

/// Resolve context for an optional calling context type name
fn calling_context(registry: &TypeRegistry, name: Option<&str>) -> Result<ResolveContext, Box<dyn std::error::Error>> {
    let context = ResolveContext::default();
    match name {
        Some(name) => {
            let handle = registry
                .find_type(name)
                .ok_or_else(|| format!("Unknown calling context type '{}'", name))?;
            Ok(context.with_calling_context(handle))
        }
        None => Ok(context),
    }
}

fn load_config(path: Option<PathBuf>) -> Result<ResolverConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(ResolverConfig::from_json_file(&path)
            .map_err(|e| format!("Failed to load config: {}", e))?),
        None => Ok(ResolverConfig::default()),
    }
}
