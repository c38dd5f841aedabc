//! Lambda向けバイナリのコンパイル

use crate::error::{BuildError, Result};
use crate::progress::BuildProgress;
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;

/// コンパイル要求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub project_dir: PathBuf,
    pub bin: Option<String>,
    pub target: String,
    pub features: Vec<String>,
    /// 生成したバイナリのコピー先
    pub output: PathBuf,
}

/// コンパイラの抽象
#[async_trait]
pub trait Toolchain: Send + Sync {
    /// `request.output` に実行ファイルを生成する
    async fn compile(&self, request: &CompileRequest) -> Result<()>;
}

/// `cargo build` によるコンパイル
pub struct CargoToolchain {
    cargo: PathBuf,
}

impl Default for CargoToolchain {
    fn default() -> Self {
        Self::new()
    }
}

impl CargoToolchain {
    /// `CARGO` 環境変数があればそれを、無ければ PATH 上の `cargo` を使用
    pub fn new() -> Self {
        let cargo = std::env::var_os("CARGO")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("cargo"));
        Self { cargo }
    }

    pub fn with_program(cargo: impl Into<PathBuf>) -> Self {
        Self {
            cargo: cargo.into(),
        }
    }

    fn build_args(request: &CompileRequest) -> Vec<String> {
        let mut args = vec![
            "build".to_string(),
            "--release".to_string(),
            "--target".to_string(),
            request.target.clone(),
            "--message-format=json-render-diagnostics".to_string(),
        ];
        if !request.features.is_empty() {
            args.push("--features".to_string());
            args.push(request.features.join(","));
        }
        if let Some(bin) = &request.bin {
            args.push("--bin".to_string());
            args.push(bin.clone());
        }
        args
    }
}

#[derive(Deserialize)]
struct CargoMessage {
    reason: String,
    #[serde(default)]
    executable: Option<PathBuf>,
    #[serde(default)]
    target: Option<CargoTarget>,
}

#[derive(Deserialize)]
struct CargoTarget {
    name: String,
}

/// `--message-format=json` の出力から実行ファイルのパスを取り出す
fn find_executable(stdout: &str, bin: Option<&str>) -> Option<PathBuf> {
    stdout
        .lines()
        .filter_map(|line| serde_json::from_str::<CargoMessage>(line).ok())
        .filter(|message| message.reason == "compiler-artifact")
        .filter(|message| match (bin, &message.target) {
            (Some(bin), Some(target)) => target.name == bin,
            _ => true,
        })
        .filter_map(|message| message.executable)
        .last()
}

fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(20);
    lines[start..].join("\n")
}

#[async_trait]
impl Toolchain for CargoToolchain {
    async fn compile(&self, request: &CompileRequest) -> Result<()> {
        if !request.project_dir.is_dir() {
            return Err(BuildError::ProjectNotFound(request.project_dir.clone()));
        }

        let args = Self::build_args(request);
        tracing::debug!("Building application binary: {:?} {:?}", self.cargo, args);

        let binary_name = file_name(&request.output);
        let progress = BuildProgress::new(&binary_name);

        let output = Command::new(&self.cargo)
            .args(&args)
            .current_dir(&request.project_dir)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                progress.finish_error(&e.to_string());
                match e.kind() {
                    std::io::ErrorKind::NotFound => {
                        BuildError::ToolchainNotFound(self.cargo.display().to_string())
                    }
                    _ => BuildError::Io(e),
                }
            })?;

        if !output.status.success() {
            let tail = stderr_tail(&output.stderr);
            progress.finish_error(&output.status.to_string());
            tracing::error!("Compiler output:\n{}", tail);
            return Err(BuildError::CompilationFailed(format!(
                "{} ({})",
                output.status, tail
            )));
        }
        tracing::debug!("Compiler output:\n{}", String::from_utf8_lossy(&output.stderr));

        let stdout = String::from_utf8_lossy(&output.stdout);
        let executable = find_executable(&stdout, request.bin.as_deref()).ok_or_else(|| {
            progress.finish_error("no executable produced");
            BuildError::OutputNotFound(request.project_dir.join("target").join(&request.target))
        })?;

        tokio::fs::copy(&executable, &request.output).await?;
        progress.finish_success();
        tracing::debug!(
            "Copied {} -> {}",
            executable.display(),
            request.output.display()
        );
        Ok(())
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
