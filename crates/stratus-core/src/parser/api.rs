//! api ノードのパース

use super::{first_string, required_name, string_args, string_prop};
use crate::error::{ManifestError, Result};
use crate::model::{ApiResource, ApiSpec};
use kdl::KdlNode;

/// api ノードをパース
pub fn parse_api(node: &KdlNode) -> Result<ApiSpec> {
    let mut api = ApiSpec::new(required_name(node)?);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "stage" => {
                    if let Some(stage) = first_string(child) {
                        api.stage = stage;
                    }
                }
                "description" => {
                    if let Some(description) = first_string(child) {
                        api.description = description;
                    }
                }
                "resource" => {
                    api.resources.push(parse_resource(child)?);
                }
                _ => {}
            }
        }
    }

    Ok(api)
}

/// resource ノードをパース
fn parse_resource(node: &KdlNode) -> Result<ApiResource> {
    let path = required_name(node)?;
    let function = string_prop(node, "function").ok_or_else(|| {
        ManifestError::InvalidConfig(format!("api resource '{}' requires function=", path))
    })?;

    let mut resource = ApiResource::new(path, function);
    if let Some(children) = node.children() {
        for child in children.nodes() {
            if child.name().value() == "method" {
                resource.methods.extend(string_args(child));
            }
        }
    }

    Ok(resource)
}
