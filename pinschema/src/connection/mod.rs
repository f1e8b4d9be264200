// Copyright (c) 2024-2025 DeepGraph Inc.
// SPDX-License-Identifier: Apache-2.0
//
//! Connection response policy
//!
//! Layered on top of `PinTypeCompatibilityResolver`: given two concrete pins
//! (with their owning nodes and existing links), decide whether a link may be
//! made, whether existing links must be broken first, and whether a
//! conversion node has to be inserted.

use serde::Serialize;
use std::fmt;

use crate::resolver::{ConversionPlan, PinLabels, PinTypeCompatibilityResolver, ResolveContext};
use crate::types::{type_to_text, PinDirection, PinType, TypeHandle};

/// Identity of a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

/// What the policy needs to know about the node owning a pin
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub id: NodeId,
    /// The self pin may take several objects at once (for-each expansion)
    pub allows_multiple_self: bool,
    /// Class declaring the function a call node invokes
    pub call_target_scope: Option<TypeHandle>,
    /// Scalar wildcard inputs of this node accept arrays
    pub input_wildcard_accepts_array: bool,
    /// Type `self` resolves to inside the graph owning this node
    pub calling_context: Option<TypeHandle>,
}

impl NodeDescriptor {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            allows_multiple_self: false,
            call_target_scope: None,
            input_wildcard_accepts_array: true,
            calling_context: None,
        }
    }

    /// Node calling a function declared on `scope`
    pub fn call(id: NodeId, scope: TypeHandle) -> Self {
        Self {
            call_target_scope: Some(scope),
            ..Self::new(id)
        }
    }
}

/// A pin as seen by the connection policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphPin {
    pub name: String,
    pub node: NodeDescriptor,
    pub direction: PinDirection,
    pub pin_type: PinType,
    /// Implicit target object pin of a call
    pub is_self: bool,
    /// Left behind after its declaration disappeared
    pub is_orphaned: bool,
    /// Types of the pins this pin is already linked to
    pub linked_types: Vec<PinType>,
}

impl GraphPin {
    pub fn new(name: &str, node: NodeDescriptor, direction: PinDirection, pin_type: PinType) -> Self {
        Self {
            name: name.to_string(),
            node,
            direction,
            pin_type,
            is_self: false,
            is_orphaned: false,
            linked_types: Vec::new(),
        }
    }

    pub fn input(name: &str, node: NodeDescriptor, pin_type: PinType) -> Self {
        Self::new(name, node, PinDirection::Input, pin_type)
    }

    pub fn output(name: &str, node: NodeDescriptor, pin_type: PinType) -> Self {
        Self::new(name, node, PinDirection::Output, pin_type)
    }

    pub fn as_self(mut self) -> Self {
        self.is_self = true;
        self
    }

    pub fn orphaned(mut self) -> Self {
        self.is_orphaned = true;
        self
    }

    pub fn linked_to(mut self, pin_type: PinType) -> Self {
        self.linked_types.push(pin_type);
        self
    }

    pub fn is_linked(&self) -> bool {
        !self.linked_types.is_empty()
    }
}

/// Kind of response to a connection attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionResponseKind {
    Make,
    /// Make the link after breaking the other links of pin A
    BreakOthersA,
    /// Make the link after breaking the other links of pin B
    BreakOthersB,
    MakeWithConversionNode,
    Disallow,
}

impl fmt::Display for ConnectionResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ConnectionResponseKind::Make => "make",
            ConnectionResponseKind::BreakOthersA => "break others (A)",
            ConnectionResponseKind::BreakOthersB => "break others (B)",
            ConnectionResponseKind::MakeWithConversionNode => "make with conversion node",
            ConnectionResponseKind::Disallow => "disallow",
        };
        f.write_str(text)
    }
}

/// Answer to a connection attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionResponse {
    pub kind: ConnectionResponseKind,
    pub message: String,
    pub is_fatal: bool,
    /// Resolution behind the answer, absent for structural rejections
    pub plan: Option<ConversionPlan>,
}

impl ConnectionResponse {
    fn new(kind: ConnectionResponseKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            is_fatal: false,
            plan: None,
        }
    }

    fn disallow(message: impl Into<String>) -> Self {
        Self::new(ConnectionResponseKind::Disallow, message)
    }

    fn with_plan(mut self, plan: ConversionPlan) -> Self {
        self.plan = Some(plan);
        self
    }

    pub fn is_allowed(&self) -> bool {
        self.kind != ConnectionResponseKind::Disallow
    }
}

/// Decides the response to connecting two pins
#[derive(Clone, Copy)]
pub struct ConnectionPolicy<'a> {
    resolver: PinTypeCompatibilityResolver<'a>,
}

impl<'a> ConnectionPolicy<'a> {
    pub fn new(resolver: PinTypeCompatibilityResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Full connection query between two pins, in the order the user picked them
    pub fn can_create_connection(&self, pin_a: &GraphPin, pin_b: &GraphPin) -> ConnectionResponse {
        if pin_a.node.id == pin_b.node.id {
            return ConnectionResponse::disallow("Both are on the same node");
        }

        if pin_a.is_orphaned || pin_b.is_orphaned {
            return ConnectionResponse::disallow("Cannot make new connections to orphaned pin");
        }

        let (output, input) = match (pin_a.direction, pin_b.direction) {
            (PinDirection::Output, PinDirection::Input) => (pin_a, pin_b),
            (PinDirection::Input, PinDirection::Output) => (pin_b, pin_a),
            _ => return ConnectionResponse::disallow("Directions are not compatible"),
        };

        let context = self.context_for(pin_a, input);
        let plan = self.resolver.resolve(&output.pin_type, &input.pin_type, &context);

        match plan {
            ConversionPlan::DirectlyCompatible => self
                .determine_response(pin_a, input, output)
                .with_plan(ConversionPlan::DirectlyCompatible),
            plan @ (ConversionPlan::RequiresConversionFunction { .. } | ConversionPlan::RequiresConversionNode { .. }) => {
                let reflection = self.resolver.reflection();
                let message = format!(
                    "Convert {} to {}",
                    type_to_text(&output.pin_type, reflection),
                    type_to_text(&input.pin_type, reflection)
                );
                ConnectionResponse::new(ConnectionResponseKind::MakeWithConversionNode, message).with_plan(plan)
            }
            ConversionPlan::Incompatible(_) => {
                let labels = PinLabels {
                    first: &pin_a.name,
                    second: &pin_b.name,
                    first_is_output: pin_a.direction == PinDirection::Output,
                };
                let diagnosis = self
                    .resolver
                    .diagnose(&output.pin_type, &input.pin_type, Some(labels));
                let mut response = ConnectionResponse::disallow(diagnosis.reason.clone());
                response.is_fatal = diagnosis.is_fatal;
                response.with_plan(ConversionPlan::Incompatible(diagnosis))
            }
        }
    }

    /// Response for two pins whose types are directly compatible
    ///
    /// An exec output and a data input keep a single link; connecting to
    /// one that is already linked breaks its other links. A multi-self input
    /// is exempt when neither side, nor any existing link, is a container.
    pub fn determine_response(&self, pin_a: &GraphPin, input: &GraphPin, output: &GraphPin) -> ConnectionResponse {
        let break_for_exec_output = output.pin_type.is_exec() && output.is_linked();
        let break_for_data_input = !input.pin_type.is_exec() && input.is_linked();

        let multiple_self_exception = break_for_data_input
            && input.is_self
            && input.node.allows_multiple_self
            && !input.pin_type.is_container()
            && !output.pin_type.is_container()
            && !input.linked_types.iter().any(PinType::is_container);

        let side = |pin: &GraphPin| {
            if pin == pin_a {
                ConnectionResponseKind::BreakOthersA
            } else {
                ConnectionResponseKind::BreakOthersB
            }
        };

        if break_for_exec_output {
            ConnectionResponse::new(side(output), "Replace existing output connections")
        } else if break_for_data_input && !multiple_self_exception {
            ConnectionResponse::new(side(input), "Replace existing input connections")
        } else {
            ConnectionResponse::new(ConnectionResponseKind::Make, "")
        }
    }

    /// Calling context comes from pin A's node; the remaining flags from the input's
    fn context_for(&self, pin_a: &GraphPin, input: &GraphPin) -> ResolveContext {
        let ignore_container = input.node.allows_multiple_self && input.is_self && !input.pin_type.is_container();
        let self_target = if input.is_self {
            input.node.call_target_scope
        } else {
            None
        };
        let mut context = ResolveContext {
            calling_context: pin_a.node.calling_context,
            ignore_container,
            input_wildcard_accepts_array: input.node.input_wildcard_accepts_array,
            ..ResolveContext::default()
        };
        if let Some(scope) = self_target {
            context = context.with_self_target(scope);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocast::AutocastFunctionRegistry;
    use crate::config::ResolverConfig;
    use crate::reflection::TypeRegistry;
    use crate::types::PinCategory;

    fn node(id: u32) -> NodeDescriptor {
        NodeDescriptor::new(NodeId(id))
    }

    fn with_policy<F: FnOnce(&ConnectionPolicy<'_>)>(registry: &TypeRegistry, f: F) {
        let autocasts = AutocastFunctionRegistry::default();
        let config = ResolverConfig::default();
        let resolver = PinTypeCompatibilityResolver::new(registry, &autocasts, &config);
        f(&ConnectionPolicy::new(resolver));
    }

    #[test]
    fn test_structural_rejections() {
        let registry = TypeRegistry::new();
        with_policy(&registry, |policy| {
            let int = PinType::new(PinCategory::Int);
            let out = GraphPin::output("Value", node(1), int.clone());
            let same_node = GraphPin::input("In", node(1), int.clone());
            let other_output = GraphPin::output("Other", node(2), int.clone());
            let orphan = GraphPin::input("Old", node(2), int.clone()).orphaned();

            assert_eq!(policy.can_create_connection(&out, &same_node).message, "Both are on the same node");
            assert_eq!(
                policy.can_create_connection(&out, &other_output).message,
                "Directions are not compatible"
            );
            assert_eq!(
                policy.can_create_connection(&out, &orphan).message,
                "Cannot make new connections to orphaned pin"
            );
        });
    }

    #[test]
    fn test_linked_data_input_breaks_others() {
        let registry = TypeRegistry::new();
        with_policy(&registry, |policy| {
            let int = PinType::new(PinCategory::Int);
            let out = GraphPin::output("Value", node(1), int.clone());
            let input = GraphPin::input("In", node(2), int.clone()).linked_to(int.clone());

            let response = policy.can_create_connection(&out, &input);
            assert_eq!(response.kind, ConnectionResponseKind::BreakOthersB);
            let response = policy.can_create_connection(&input, &out);
            assert_eq!(response.kind, ConnectionResponseKind::BreakOthersA);
        });
    }

    #[test]
    fn test_linked_exec_output_breaks_others() {
        let registry = TypeRegistry::new();
        with_policy(&registry, |policy| {
            let then = GraphPin::output("Then", node(1), PinType::exec()).linked_to(PinType::exec());
            let execute = GraphPin::input("Execute", node(2), PinType::exec()).linked_to(PinType::exec());

            let response = policy.can_create_connection(&then, &execute);
            assert_eq!(response.kind, ConnectionResponseKind::BreakOthersA);
            assert_eq!(response.message, "Replace existing output connections");
        });
    }
}
