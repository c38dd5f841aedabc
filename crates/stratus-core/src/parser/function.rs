//! function ノードのパース

use super::{first_string, first_u32, required_name, string_args, string_prop};
use crate::error::{ManifestError, Result};
use crate::model::{EventSourceMapping, FunctionSpec, Privilege, RoleDefinition};
use kdl::KdlNode;

/// function ノードをパース
pub fn parse_function(node: &KdlNode) -> Result<FunctionSpec> {
    let mut function = FunctionSpec::new(required_name(node)?);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "description" => {
                    if let Some(description) = first_string(child) {
                        function.description = description;
                    }
                }
                "role" => {
                    function.role = first_string(child);
                }
                "role-definition" | "role_definition" => {
                    function.role_definition = Some(parse_role_definition(child)?);
                }
                "memory" => {
                    if let Some(memory) = first_u32(child) {
                        function.memory_size = memory;
                    }
                }
                "timeout" => {
                    if let Some(timeout) = first_u32(child) {
                        function.timeout = timeout;
                    }
                }
                "depends-on" | "depends_on" => {
                    function.depends_on.extend(string_args(child));
                }
                "environment" | "env" => {
                    if let Some(vars) = child.children() {
                        for var in vars.nodes() {
                            let key = var.name().value().to_string();
                            let value = first_string(var).unwrap_or_default();
                            function.environment.insert(key, value);
                        }
                    }
                }
                "event-source" | "event_source" => {
                    function.event_sources.push(parse_event_source(child)?);
                }
                _ => {}
            }
        }
    }

    Ok(function)
}

/// role-definition ノードをパース
fn parse_role_definition(node: &KdlNode) -> Result<RoleDefinition> {
    let mut definition = RoleDefinition::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() != "privilege" {
                continue;
            }
            let actions = string_args(child);
            if actions.is_empty() {
                return Err(ManifestError::InvalidConfig(
                    "privilege requires at least one action".to_string(),
                ));
            }
            let resource = string_prop(child, "resource").unwrap_or_else(|| "*".to_string());
            definition.privileges.push(Privilege::new(actions, resource));
        }
    }

    Ok(definition)
}

/// event-source ノードをパース
fn parse_event_source(node: &KdlNode) -> Result<EventSourceMapping> {
    let arn = first_string(node).ok_or_else(|| {
        ManifestError::InvalidConfig("event-source requires an ARN".to_string())
    })?;

    let mut mapping = EventSourceMapping::new(arn);
    mapping.starting_position = string_prop(node, "starting-position");
    mapping.batch_size = node
        .get("batch-size")
        .and_then(|v| v.as_integer())
        .and_then(|v| u32::try_from(v).ok());
    Ok(mapping)
}
