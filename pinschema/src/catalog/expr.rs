// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Pin type expressions
//!
//! Compact text form of a pin type used by catalogs and the CLI:
//!
//! ```text
//! int                       byte:EColor            object:Actor
//! object:self               wildcard:index         int:bitmask
//! weak object:Actor         const float            array<int>
//! set<name>                 map<name, object:Actor>
//! struct:Vector&            delegate:Widget.OnClicked
//! ```
//!
//! Parsing produces a `PinTypeExpr` with type names still unresolved;
//! `resolve` looks them up in a reflection service.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while1},
    character::complete::{char, multispace0, multispace1},
    combinator::{all_consuming, map, map_res, opt},
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};

use super::error::{CatalogError, CatalogResult};
use crate::reflection::ReflectionService;
use crate::types::{ContainerShape, PinCategory, PinSubCategory, PinType};

/// Text after the `:` of a terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Qualifier {
    /// Type name or marker (`self`, `index`, `bitmask`, free-form tag)
    Name(String),
    /// `Owner.Function` delegate signature
    Member { owner: String, function: String },
}

/// Non-container part of an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminalExpr {
    pub category: PinCategory,
    pub is_weak: bool,
    pub qualifier: Option<Qualifier>,
}

/// Parsed pin type expression with unresolved names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinTypeExpr {
    pub is_const: bool,
    pub container: ContainerShape,
    pub key: TerminalExpr,
    /// Value of a map
    pub value: Option<TerminalExpr>,
    pub is_reference: bool,
}

/// Parse an expression without resolving type names
pub fn parse_pin_type_expr(input: &str) -> CatalogResult<PinTypeExpr> {
    match all_consuming(pin_type_expr)(input) {
        Ok((_, expr)) => Ok(expr),
        Err(e) => Err(CatalogError::ParseError(format!("'{}': {}", input, e))),
    }
}

/// Parse an expression and resolve it against `reflection`
pub fn parse_pin_type(input: &str, reflection: &dyn ReflectionService) -> CatalogResult<PinType> {
    parse_pin_type_expr(input)?.resolve(reflection)
}

impl PinTypeExpr {
    pub fn resolve(&self, reflection: &dyn ReflectionService) -> CatalogResult<PinType> {
        let mut pin = self.key.resolve(reflection)?;

        match self.container {
            ContainerShape::None => {}
            ContainerShape::Array => pin = pin.as_array(),
            ContainerShape::Set => pin = pin.as_set(),
            ContainerShape::Map => {
                let value = self
                    .value
                    .as_ref()
                    .ok_or_else(|| CatalogError::ParseError("map without a value type".to_string()))?;
                let value = value.resolve(reflection)?;
                if value.signature().is_some() {
                    return Err(CatalogError::ParseError(
                        "map values cannot carry a delegate signature".to_string(),
                    ));
                }
                pin = pin.as_map(value.terminal());
            }
        }

        if self.is_const {
            pin = pin.as_const();
        }
        if self.is_reference {
            pin = pin.by_ref();
        }
        Ok(pin)
    }
}

impl TerminalExpr {
    fn resolve(&self, reflection: &dyn ReflectionService) -> CatalogResult<PinType> {
        let mut pin = PinType::new(self.category);
        if self.is_weak {
            pin = pin.weak();
        }

        match &self.qualifier {
            None => {}
            Some(Qualifier::Member { owner, function }) => {
                if !self.category.is_delegate() {
                    return Err(CatalogError::ParseError(format!(
                        "{} pins cannot reference {}.{}",
                        self.category, owner, function
                    )));
                }
                let owner_type = reflection
                    .find_type(owner)
                    .ok_or_else(|| CatalogError::TypeNotFound(owner.clone()))?;
                let signature = reflection
                    .find_function(owner_type, function)
                    .ok_or_else(|| CatalogError::FunctionNotFound(format!("{}.{}", owner, function)))?;
                pin = pin.with_signature(signature);
            }
            Some(Qualifier::Name(name)) => match name.as_str() {
                "self" => pin = pin.with_sub_category(PinSubCategory::SelfContext),
                "index" => pin = pin.with_sub_category(PinSubCategory::Index),
                "bitmask" => pin = pin.bitmask(),
                _ if self.category.has_subtypes() || self.category == PinCategory::Byte => {
                    let handle = reflection
                        .find_type(name)
                        .ok_or_else(|| CatalogError::TypeNotFound(name.clone()))?;
                    pin = pin.with_sub_type(handle);
                }
                _ => pin = pin.with_sub_category(PinSubCategory::Tag(name.clone())),
            },
        }
        Ok(pin)
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn category(input: &str) -> IResult<&str, PinCategory> {
    map_res(identifier, |word: &str| word.parse::<PinCategory>())(input)
}

fn qualifier(input: &str) -> IResult<&str, Qualifier> {
    preceded(
        char(':'),
        alt((
            map(separated_pair(identifier, char('.'), identifier), |(owner, function)| {
                Qualifier::Member {
                    owner: owner.to_string(),
                    function: function.to_string(),
                }
            }),
            map(identifier, |name: &str| Qualifier::Name(name.to_string())),
        )),
    )(input)
}

fn terminal(input: &str) -> IResult<&str, TerminalExpr> {
    map(
        tuple((opt(terminated(tag("weak"), multispace1)), category, opt(qualifier))),
        |(weak, category, qualifier)| TerminalExpr {
            category,
            is_weak: weak.is_some(),
            qualifier,
        },
    )(input)
}

fn open_angle(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char('<'), multispace0)(input)
}

fn close_angle(input: &str) -> IResult<&str, char> {
    delimited(multispace0, char('>'), multispace0)(input)
}

/// Container shape with its key and optional value terminal
fn body(input: &str) -> IResult<&str, (ContainerShape, TerminalExpr, Option<TerminalExpr>)> {
    alt((
        map(
            preceded(tag("array"), delimited(open_angle, terminal, close_angle)),
            |key| (ContainerShape::Array, key, None),
        ),
        map(
            preceded(tag("set"), delimited(open_angle, terminal, close_angle)),
            |key| (ContainerShape::Set, key, None),
        ),
        map(
            preceded(
                tag("map"),
                delimited(
                    open_angle,
                    separated_pair(terminal, delimited(multispace0, char(','), multispace0), terminal),
                    close_angle,
                ),
            ),
            |(key, value)| (ContainerShape::Map, key, Some(value)),
        ),
        map(terminal, |key| (ContainerShape::None, key, None)),
    ))(input)
}

fn pin_type_expr(input: &str) -> IResult<&str, PinTypeExpr> {
    map(
        delimited(
            multispace0,
            tuple((
                opt(terminated(tag("const"), multispace1)),
                body,
                opt(preceded(multispace0, char('&'))),
            )),
            multispace0,
        ),
        |(constness, (container, key, value), reference)| PinTypeExpr {
            is_const: constness.is_some(),
            container,
            key,
            value,
            is_reference: reference.is_some(),
        },
    )(input)
}
