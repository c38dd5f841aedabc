//! サービス定義

use super::{ApiSpec, FunctionSpec, SiteSpec};
use crate::error::{ManifestError, Result};
use crate::naming::is_valid_stack_name;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;

/// Lambdaバイナリのデフォルトのビルドターゲット
pub const DEFAULT_TARGET: &str = "x86_64-unknown-linux-musl";

/// Lambdaバイナリ向けに有効化するフィーチャー
pub const DEFAULT_FEATURE: &str = "lambda-binary";

/// サービスマニフェスト
///
/// KDL形式：
/// ```kdl
/// service "demo" {
///     description "Demo service"
///     bucket "my-artifacts"
/// }
/// function "hello" {
///     role "lambda-exec"
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceManifest {
    /// サービス名（= CloudFormationスタック名）
    pub name: String,
    pub description: String,
    /// アーティファクトをアップロードするS3バケット
    pub bucket: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionSpec>,
    pub api: Option<ApiSpec>,
    pub site: Option<SiteSpec>,
    #[serde(default)]
    pub build: BuildSpec,
}

impl ServiceManifest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn function(&self, name: &str) -> Option<&FunctionSpec> {
        self.functions.iter().find(|f| f.name == name)
    }

    /// マニフェストの整合性を検証
    ///
    /// - サービス名（CloudFormationのスタック名になる）
    /// - 関数名の重複
    /// - 各関数のロール指定（どちらか一方のみ）
    /// - APIリソースが参照する関数の存在
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ManifestError::InvalidConfig(
                "service name must not be empty".to_string(),
            ));
        }
        if !is_valid_stack_name(&self.name) {
            return Err(ManifestError::InvalidConfig(format!(
                "service name must match [A-Za-z][-A-Za-z0-9]*: {}",
                self.name
            )));
        }

        let mut seen = HashSet::new();
        for function in &self.functions {
            if !seen.insert(function.name.as_str()) {
                return Err(ManifestError::DuplicateFunction(function.name.clone()));
            }
            function.check_role_config()?;
        }

        if let Some(api) = &self.api {
            for resource in &api.resources {
                if !resource.path.starts_with('/') {
                    return Err(ManifestError::InvalidConfig(format!(
                        "api resource path must start with '/': {}",
                        resource.path
                    )));
                }
                if self.function(&resource.function).is_none() {
                    return Err(ManifestError::FunctionNotFound(resource.function.clone()));
                }
            }
        }

        Ok(())
    }
}

/// ビルド設定
///
/// KDL形式：
/// ```kdl
/// build {
///     project-dir "."
///     bin "demo"
///     target "x86_64-unknown-linux-musl"
///     features "lambda-binary"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSpec {
    /// Cargoプロジェクトのディレクトリ（デフォルト: マニフェストのあるディレクトリ）
    pub project_dir: Option<PathBuf>,
    /// ビルドするバイナリ名（未指定時はパッケージのデフォルト）
    pub bin: Option<String>,
    pub target: String,
    pub features: Vec<String>,
}

impl Default for BuildSpec {
    fn default() -> Self {
        Self {
            project_dir: None,
            bin: None,
            target: DEFAULT_TARGET.to_string(),
            features: vec![DEFAULT_FEATURE.to_string()],
        }
    }
}
