//! KDLパーサー
//!
//! Stratusのマニフェスト（`stratus.kdl`）をパースします。
//! 各ノードタイプのパース処理はモジュールに分離されています。

mod api;
mod function;
mod service;

use api::parse_api;
use function::parse_function;
use service::{parse_build, parse_service, parse_site};

use crate::error::{ManifestError, Result};
use crate::model::ServiceManifest;
use crate::naming::sanitized_name;
use kdl::{KdlDocument, KdlNode};
use std::fs;
use std::path::Path;

/// KDLファイルをパースしてServiceManifestを生成
///
/// `service` ノードが無い場合はマニフェストのあるディレクトリ名をサービス名とし、
/// `build.project-dir` 未指定時はそのディレクトリをプロジェクトとみなします。
pub fn parse_manifest_file<P: AsRef<Path>>(path: P) -> Result<ServiceManifest> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ManifestError::IoError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = base_dir
        .canonicalize()
        .ok()
        .and_then(|p| p.file_name().map(|n| sanitized_name(&n.to_string_lossy())))
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "unnamed".to_string());

    let mut manifest = parse_manifest_string(&content, name)?;

    // 相対パスはマニフェストのディレクトリ基準で解決
    let project_dir = match manifest.build.project_dir.take() {
        Some(dir) if dir.is_relative() => base_dir.join(dir),
        Some(dir) => dir,
        None => base_dir.to_path_buf(),
    };
    manifest.build.project_dir = Some(project_dir);
    if let Some(site) = manifest.site.as_mut()
        && site.resources_dir.is_relative()
    {
        site.resources_dir = base_dir.join(&site.resources_dir);
    }

    Ok(manifest)
}

/// KDL文字列をパース
pub fn parse_manifest_string(content: &str, default_name: String) -> Result<ServiceManifest> {
    let doc: KdlDocument = content.parse()?;

    let mut manifest = ServiceManifest::new(default_name);

    for node in doc.nodes() {
        match node.name().value() {
            "service" => parse_service(node, &mut manifest)?,
            "function" => {
                let function = parse_function(node)?;
                tracing::debug!("Parsed function: {}", function.name);
                manifest.functions.push(function);
            }
            "api" => {
                if manifest.api.is_some() {
                    return Err(ManifestError::InvalidConfig(
                        "only one api node is allowed".to_string(),
                    ));
                }
                manifest.api = Some(parse_api(node)?);
            }
            "site" => manifest.site = Some(parse_site(node)?),
            "build" => manifest.build = parse_build(node),
            other => {
                tracing::warn!("Unknown manifest node skipped: {}", other);
            }
        }
    }

    Ok(manifest)
}

/// 最初の位置引数（文字列）
fn first_string(node: &KdlNode) -> Option<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .find_map(|e| e.value().as_string())
        .map(|s| s.to_string())
}

/// すべての位置引数（文字列）
fn string_args(node: &KdlNode) -> Vec<String> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .filter_map(|e| e.value().as_string().map(|s| s.to_string()))
        .collect()
}

/// 最初の位置引数（u32）
fn first_u32(node: &KdlNode) -> Option<u32> {
    node.entries()
        .iter()
        .filter(|e| e.name().is_none())
        .find_map(|e| e.value().as_integer())
        .and_then(|v| u32::try_from(v).ok())
}

/// 名前付きプロパティ（文字列）
fn string_prop(node: &KdlNode, key: &str) -> Option<String> {
    node.get(key)
        .and_then(|v| v.as_string())
        .map(|s| s.to_string())
}

/// ノード名を必須とする
fn required_name(node: &KdlNode) -> Result<String> {
    first_string(node).ok_or_else(|| {
        ManifestError::InvalidConfig(format!("{} requires a name", node.name().value()))
    })
}
