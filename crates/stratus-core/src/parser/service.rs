//! service / build / site ノードのパース

use super::{first_string, required_name, string_args, string_prop};
use crate::error::Result;
use crate::model::{BuildSpec, ServiceManifest, SiteSpec};
use kdl::KdlNode;
use std::path::PathBuf;

/// service ノードをパース
pub fn parse_service(node: &KdlNode, manifest: &mut ServiceManifest) -> Result<()> {
    manifest.name = required_name(node)?;

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "description" => {
                    if let Some(description) = first_string(child) {
                        manifest.description = description;
                    }
                }
                "bucket" => {
                    manifest.bucket = first_string(child);
                }
                _ => {}
            }
        }
    }

    Ok(())
}

/// build ノードをパース
pub fn parse_build(node: &KdlNode) -> BuildSpec {
    let mut build = BuildSpec::default();

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "project-dir" | "project_dir" => {
                    build.project_dir = first_string(child).map(PathBuf::from);
                }
                "bin" => {
                    build.bin = first_string(child);
                }
                "target" => {
                    if let Some(target) = first_string(child) {
                        build.target = target;
                    }
                }
                "features" => {
                    build.features = string_args(child);
                }
                _ => {}
            }
        }
    }

    build
}

/// site ノードをパース
pub fn parse_site(node: &KdlNode) -> Result<SiteSpec> {
    let mut site = SiteSpec::new(required_name(node)?);
    site.bucket_name = string_prop(node, "bucket-name");
    if let Some(index) = string_prop(node, "index") {
        site.index_document = index;
    }
    if let Some(error) = string_prop(node, "error") {
        site.error_document = error;
    }
    Ok(site)
}
