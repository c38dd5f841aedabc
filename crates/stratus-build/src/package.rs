//! アーティファクトのパッケージング

use crate::adapter::generate_adapter;
use crate::archive::{PackageContents, temporary_archive, write_package, write_site};
use crate::assets::{ADAPTER_BASE, asset};
use crate::error::{BuildError, Result};
use crate::toolchain::{CompileRequest, Toolchain};
use std::path::{Path, PathBuf};
use stratus_core::{BuildSpec, FunctionSpec, sanitized_name};
use tempfile::TempPath;

/// Lambda実行ファイル名
pub fn binary_name(service_name: &str) -> String {
    format!("{}.lambda.amd64", sanitized_name(service_name))
}

/// パッケージング要求
#[derive(Debug, Clone, Copy)]
pub struct PackageRequest<'a> {
    pub service_name: &'a str,
    pub functions: &'a [FunctionSpec],
    pub build: &'a BuildSpec,
    /// 一時ファイルを作成するディレクトリ
    pub work_dir: &'a Path,
    pub support_bundle: Option<&'a Path>,
}

/// 作成済みのパッケージ（drop時に削除される）
#[derive(Debug)]
pub struct PackagedArchive {
    pub path: TempPath,
    pub binary_name: String,
    pub binary_size: u64,
}

/// バイナリをコンパイルし、アダプタ・スクリプトと共にZIP化
///
/// 中間の実行ファイルは成功・失敗に関わらず削除されます。
pub async fn package(
    toolchain: &dyn Toolchain,
    request: &PackageRequest<'_>,
) -> Result<PackagedArchive> {
    let binary_name = binary_name(request.service_name);
    let binary = TempPath::from_path(request.work_dir.join(&binary_name));

    let compile = CompileRequest {
        project_dir: request
            .build
            .project_dir
            .clone()
            .unwrap_or_else(|| request.work_dir.to_path_buf()),
        bin: request.build.bin.clone(),
        target: request.build.target.clone(),
        features: request.build.features.clone(),
        output: binary.to_path_buf(),
    };
    tracing::info!("Compiling binary: {}", binary_name);
    tracing::debug!("Compile request: {:?}", compile);
    toolchain.compile(&compile).await?;

    let binary_size = tokio::fs::metadata(&binary)
        .await
        .map_err(|_| BuildError::OutputNotFound(binary.to_path_buf()))?
        .len();
    tracing::info!(
        "Executable binary size: {} KB ({} MB)",
        binary_size / 1024,
        binary_size / (1024 * 1024)
    );

    let base = asset(ADAPTER_BASE).ok_or_else(|| {
        BuildError::InvalidConfig(format!("embedded asset missing: {}", ADAPTER_BASE))
    })?;
    let adapter_source =
        generate_adapter(base, request.functions, &binary_name, request.service_name);
    tracing::debug!("Dynamically generated NodeJS adapter:\n{}", adapter_source);

    let (file, archive_path) =
        temporary_archive(&sanitized_name(request.service_name), request.work_dir)?;
    tracing::info!("Creating ZIP archive for upload: {}", archive_path.display());

    let binary_path: PathBuf = binary.to_path_buf();
    let bundle = request.support_bundle.map(Path::to_path_buf);
    let archive_binary_name = binary_name.clone();
    tokio::task::spawn_blocking(move || {
        let contents = PackageContents {
            binary: &binary_path,
            binary_name: &archive_binary_name,
            adapter_source: &adapter_source,
            support_bundle: bundle.as_deref(),
        };
        write_package(file, &contents).map(|_| ())
    })
    .await
    .map_err(|e| BuildError::Io(std::io::Error::other(e)))??;

    if let Err(e) = binary.close() {
        tracing::warn!("Failed to delete binary: {}", e);
    }

    Ok(PackagedArchive {
        path: archive_path,
        binary_name,
        binary_size,
    })
}

/// サイトディレクトリを一時ZIPにまとめる
pub async fn package_site(service_name: &str, site_dir: &Path, work_dir: &Path) -> Result<TempPath> {
    let prefix = format!("{}-S3Site", sanitized_name(service_name));
    let (file, archive_path) = temporary_archive(&prefix, work_dir)?;
    tracing::info!(
        "Creating S3 site archive: {} -> {}",
        site_dir.display(),
        archive_path.display()
    );

    let site_dir = site_dir.to_path_buf();
    tokio::task::spawn_blocking(move || write_site(file, &site_dir).map(|_| ()))
        .await
        .map_err(|e| BuildError::Io(std::io::Error::other(e)))??;

    Ok(archive_path)
}
