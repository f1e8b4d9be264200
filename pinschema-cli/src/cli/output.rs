// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Result formatting for CLI output

use colored::*;
use comfy_table::{presets::UTF8_FULL, Cell, Color, Table};
use pinschema::types::FunctionHandle;
use pinschema::{
    type_to_text, AutocastFunctionRegistry, ConversionFunction, ConversionNode, ConversionPlan, PinType,
    ReflectionService, TypeCategoryTable, TypeRegistry,
};

use super::commands::OutputFormat;

/// Formatter for the different output formats
pub struct ResultFormatter;

impl ResultFormatter {
    /// Format a resolution result
    pub fn format_plan(
        registry: &TypeRegistry,
        output: &PinType,
        input: &PinType,
        plan: &ConversionPlan,
        format: OutputFormat,
    ) -> String {
        let output_text = type_to_text(output, registry);
        let input_text = type_to_text(input, registry);
        let (verdict, detail) = Self::describe_plan(registry, plan);

        match format {
            OutputFormat::Table => {
                let mut result = String::new();
                result.push_str(&format!("{}\n\n", "Resolution".bold().green()));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![
                    Cell::new("Output").fg(Color::Green),
                    Cell::new("Input").fg(Color::Green),
                    Cell::new("Result").fg(Color::Green),
                    Cell::new("Detail").fg(Color::Green),
                ]);
                let verdict_color = match plan {
                    ConversionPlan::DirectlyCompatible => Color::Green,
                    ConversionPlan::Incompatible(_) => Color::Red,
                    _ => Color::Yellow,
                };
                table.add_row(vec![
                    Cell::new(&output_text),
                    Cell::new(&input_text),
                    Cell::new(verdict).fg(verdict_color),
                    Cell::new(&detail),
                ]);
                result.push_str(&table.to_string());
                result.push('\n');

                if let ConversionPlan::Incompatible(incompatibility) = plan {
                    let severity = if incompatibility.is_fatal {
                        "fatal".red().bold()
                    } else {
                        "non-fatal".yellow()
                    };
                    result.push_str(&format!("\nSeverity: {}\n", severity));
                }
                result
            }
            OutputFormat::Json => {
                let json_result = serde_json::json!({
                    "status": "success",
                    "output": output_text,
                    "input": input_text,
                    "result": verdict,
                    "detail": detail,
                    "plan": plan,
                });
                Self::to_json(&json_result)
            }
        }
    }

    /// Format the autocast table
    pub fn format_autocasts(
        registry: &TypeRegistry,
        autocasts: &AutocastFunctionRegistry,
        format: OutputFormat,
    ) -> String {
        let entries = autocasts.entries();

        match format {
            OutputFormat::Table => {
                if entries.is_empty() {
                    return format!("{}\n", "No autocast functions found".yellow());
                }

                let mut result = String::new();
                result.push_str(&format!("{}\n", "Autocast Functions".bold().green()));
                result.push_str(&format!("Entries: {}\n\n", entries.len()));

                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![
                    Cell::new("From").fg(Color::Green),
                    Cell::new("To").fg(Color::Green),
                    Cell::new("Function").fg(Color::Green),
                ]);
                for entry in &entries {
                    table.add_row(vec![
                        entry.input.to_string(),
                        entry.output.to_string(),
                        function_label(registry, entry.function),
                    ]);
                }
                result.push_str(&table.to_string());
                result.push('\n');
                result
            }
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = entries
                    .iter()
                    .map(|entry| {
                        serde_json::json!({
                            "from": entry.input,
                            "to": entry.output,
                            "function": function_label(registry, entry.function),
                        })
                    })
                    .collect();
                Self::to_json(&serde_json::json!({
                    "status": "success",
                    "entries": rows,
                }))
            }
        }
    }

    /// Format the category table
    pub fn format_categories(format: OutputFormat) -> String {
        match format {
            OutputFormat::Table => {
                let mut table = Table::new();
                table.load_preset(UTF8_FULL);
                table.set_header(vec![
                    Cell::new("Category").fg(Color::Green),
                    Cell::new("Display Name").fg(Color::Green),
                    Cell::new("Sub-types").fg(Color::Green),
                ]);
                for category in TypeCategoryTable::categories() {
                    let subtypes = if TypeCategoryTable::has_subtypes(category) {
                        "yes"
                    } else {
                        ""
                    };
                    table.add_row(vec![
                        category.as_str(),
                        TypeCategoryTable::display_name(category),
                        subtypes,
                    ]);
                }
                format!("{}\n", table)
            }
            OutputFormat::Json => {
                let rows: Vec<serde_json::Value> = TypeCategoryTable::categories()
                    .map(|category| {
                        serde_json::json!({
                            "category": category.as_str(),
                            "display_name": TypeCategoryTable::display_name(category),
                            "has_subtypes": TypeCategoryTable::has_subtypes(category),
                        })
                    })
                    .collect();
                Self::to_json(&serde_json::json!({ "categories": rows }))
            }
        }
    }

    /// Short verdict and a human-readable detail line
    fn describe_plan(registry: &TypeRegistry, plan: &ConversionPlan) -> (&'static str, String) {
        let type_name = |handle| registry.type_name(handle).unwrap_or("?").to_string();

        match plan {
            ConversionPlan::DirectlyCompatible => ("compatible", String::new()),
            ConversionPlan::RequiresConversionFunction { function } => {
                let name = match function {
                    ConversionFunction::Library(handle) => function_label(registry, *handle),
                    ConversionFunction::Intrinsic(intrinsic) => intrinsic.name().to_string(),
                };
                ("conversion function", name)
            }
            ConversionPlan::RequiresConversionNode { node } => {
                let detail = match node {
                    ConversionNode::SetToArray => "set to array".to_string(),
                    ConversionNode::MakeArray => "make array".to_string(),
                    ConversionNode::FetchMember { field, field_type } => {
                        format!("fetch member {} ({})", field, type_name(*field_type))
                    }
                    ConversionNode::EnumToName { enum_type } => format!("{} to name", type_name(*enum_type)),
                    ConversionNode::EnumToString { enum_type } => format!("{} to string", type_name(*enum_type)),
                    ConversionNode::ByteToEnum { enum_type, safe } => {
                        let mode = if *safe { "safe" } else { "unchecked" };
                        format!("byte to {} ({})", type_name(*enum_type), mode)
                    }
                    ConversionNode::DynamicCast { target } => format!("cast to {}", type_name(*target)),
                    ConversionNode::ConvertAsset { from, to } => {
                        format!("{} to {}", from.display_name(), to.display_name())
                    }
                };
                ("conversion node", detail)
            }
            ConversionPlan::Incompatible(incompatibility) => ("incompatible", incompatibility.reason.clone()),
        }
    }

    fn to_json(value: &serde_json::Value) -> String {
        let mut text = serde_json::to_string_pretty(value).unwrap_or_else(|_| {
            "{\"status\": \"error\", \"error\": \"Could not serialize results to JSON\"}".to_string()
        });
        text.push('\n');
        text
    }
}

/// `Owner::Function` label for a function handle
fn function_label(registry: &TypeRegistry, function: FunctionHandle) -> String {
    registry
        .function_info(function)
        .map(|info| {
            let owner = info.owner.and_then(|owner| registry.type_name(owner)).unwrap_or("?");
            format!("{}::{}", owner, info.name)
        })
        .unwrap_or_else(|| function.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pinschema::{Incompatibility, PinCategory};

    fn parse(text: &str) -> serde_json::Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn test_plan_as_json() {
        let registry = TypeRegistry::new();
        let output = PinType::new(PinCategory::Int).as_set();
        let input = PinType::new(PinCategory::Int).as_array();
        let plan = ConversionPlan::RequiresConversionNode {
            node: ConversionNode::SetToArray,
        };

        let json = parse(&ResultFormatter::format_plan(&registry, &output, &input, &plan, OutputFormat::Json));
        assert_eq!(json["status"], "success");
        assert_eq!(json["result"], "conversion node");
        assert_eq!(json["detail"], "set to array");
        assert_eq!(json["plan"]["plan"], "requires_conversion_node");
        assert_eq!(json["plan"]["node"]["kind"], "set_to_array");
    }

    #[test]
    fn test_incompatible_plan_as_table() {
        colored::control::set_override(false);
        let registry = TypeRegistry::new();
        let plan = ConversionPlan::Incompatible(Incompatibility {
            reason: "Integer is not compatible with Name".to_string(),
            is_fatal: true,
        });

        let text = ResultFormatter::format_plan(
            &registry,
            &PinType::new(PinCategory::Int),
            &PinType::new(PinCategory::Name),
            &plan,
            OutputFormat::Table,
        );
        assert!(text.contains("incompatible"));
        assert!(text.contains("Integer is not compatible with Name"));
        assert!(text.contains("Severity: fatal"));
    }

    #[test]
    fn test_direct_plan_has_no_severity() {
        colored::control::set_override(false);
        let registry = TypeRegistry::new();
        let int = PinType::new(PinCategory::Int);

        let text =
            ResultFormatter::format_plan(&registry, &int, &int, &ConversionPlan::DirectlyCompatible, OutputFormat::Table);
        assert!(text.contains("compatible"));
        assert!(!text.contains("Severity"));
    }

    #[test]
    fn test_categories_as_json() {
        let json = parse(&ResultFormatter::format_categories(OutputFormat::Json));
        let rows = json["categories"].as_array().unwrap();
        assert_eq!(rows.len(), TypeCategoryTable::categories().count());

        let object = rows.iter().find(|row| row["category"] == "object").unwrap();
        assert_eq!(object["display_name"], "Object Reference");
        assert_eq!(object["has_subtypes"], true);

        let int = rows.iter().find(|row| row["category"] == "int").unwrap();
        assert_eq!(int["has_subtypes"], false);
    }

    #[test]
    fn test_categories_as_table() {
        let text = ResultFormatter::format_categories(OutputFormat::Table);
        assert!(text.contains("Display Name"));
        assert!(text.contains("Soft Class Reference"));
    }
}
