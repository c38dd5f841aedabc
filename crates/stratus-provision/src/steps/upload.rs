//! アーカイブのアップロード

use crate::context::WorkflowContext;
use crate::error::{ProvisionError, Result};
use crate::rollback::RollbackAction;
use crate::workflow::{Step, Transition};
use std::path::Path;
use std::sync::Arc;
use stratus_build::PackagedArchive;
use stratus_cloud::{CloudError, ObjectBody, ObjectStore};
use stratus_core::SiteSpec;
use tempfile::TempPath;

pub const ZIP_CONTENT_TYPE: &str = "application/zip";

/// アップロード済みオブジェクト
#[derive(Debug)]
pub struct UploadedObject {
    pub key: String,
    pub rollback: RollbackAction,
}

/// 一つのバケットへのアップローダ
#[derive(Clone)]
pub struct Uploader<'a> {
    pub store: Arc<dyn ObjectStore>,
    pub bucket: &'a str,
    pub noop: bool,
}

impl Uploader<'_> {
    /// バケットにオブジェクトの有効期限ルールがあるか確認
    ///
    /// ルールが無い・無効な場合は警告のみ。想定外のエラーは失敗とします。
    pub async fn ensure_expiration_policy(&self) -> Result<()> {
        if self.noop {
            tracing::info!("Bypassing bucket expiration policy check due to -n/--noop");
            return Ok(());
        }

        match self.store.lifecycle_rules(self.bucket).await {
            Ok(rules) => {
                if !rules.iter().any(|rule| rule.enabled) {
                    tracing::warn!(
                        "Bucket should have ObjectExpiration lifecycle enabled: {}",
                        self.bucket
                    );
                } else {
                    tracing::debug!("Bucket lifecycle configuration is valid: {}", self.bucket);
                }
                Ok(())
            }
            Err(CloudError::LifecycleConfigurationNotFound(_)) => {
                tracing::warn!(
                    "Bucket should have ObjectExpiration lifecycle enabled: {}",
                    self.bucket
                );
                Ok(())
            }
            Err(e) => Err(ProvisionError::BucketPolicy(e.to_string())),
        }
    }

    /// ローカルファイルをアップロードし、キーと削除用ロールバックを返す
    ///
    /// キーはローカルのファイル名です。
    pub async fn upload_local_file(&self, path: &Path) -> Result<UploadedObject> {
        let key = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ProvisionError::Config(format!("Invalid archive path: {}", path.display()))
            })?;

        self.ensure_expiration_policy().await?;

        if self.noop {
            tracing::info!(
                "Bypassing S3 upload due to -n/--noop: s3://{}/{}",
                self.bucket,
                key
            );
        } else {
            let receipt = self
                .store
                .put_object(
                    self.bucket,
                    &key,
                    ObjectBody::File(path.to_path_buf()),
                    ZIP_CONTENT_TYPE,
                )
                .await?;
            tracing::info!("Upload complete: {}", receipt.location);
        }

        Ok(UploadedObject {
            rollback: RollbackAction::delete_object(
                self.store.clone(),
                self.bucket,
                key.as_str(),
                self.noop,
            ),
            key,
        })
    }
}

fn discard(path: TempPath) {
    let shown = path.display().to_string();
    if let Err(e) = path.close() {
        tracing::warn!("Failed to delete temporary file {}: {}", shown, e);
    }
}

async fn upload_code(uploader: &Uploader<'_>, archive: PackagedArchive) -> Result<UploadedObject> {
    let result = uploader.upload_local_file(&archive.path).await;
    discard(archive.path);
    result
}

async fn upload_site(
    uploader: &Uploader<'_>,
    service_name: &str,
    site: &SiteSpec,
    work_dir: &Path,
) -> Result<UploadedObject> {
    let archive = stratus_build::package_site(service_name, &site.resources_dir, work_dir).await?;
    let result = uploader.upload_local_file(&archive).await;
    discard(archive);
    result
}

/// コードバンドル（とサイトアーカイブ）を並行してアップロード
///
/// 片方が失敗してももう片方は中断せず、成功した分のロールバックは登録されます。
/// 失敗は一つのエラーにまとめて返します。
pub async fn upload_packages(
    ctx: &mut WorkflowContext,
    archive: PackagedArchive,
) -> Result<Transition> {
    let uploader = Uploader {
        store: ctx.session.object_store.clone(),
        bucket: &ctx.bucket,
        noop: ctx.noop,
    };

    let site_spec = ctx.site.as_ref().map(|site| &site.spec);
    let service_name = ctx.service_name.as_str();
    let work_dir = ctx.work_dir.as_path();

    let code = upload_code(&uploader, archive);
    let site = async {
        match site_spec {
            Some(spec) => upload_site(&uploader, service_name, spec, work_dir)
                .await
                .map(Some),
            None => Ok(None),
        }
    };
    let (code_result, site_result) = tokio::join!(code, site);

    let mut errors = Vec::new();
    let mut code_key = None;
    let mut site_key = None;

    match code_result {
        Ok(uploaded) => {
            ctx.rollbacks.register(uploaded.rollback);
            code_key = Some(uploaded.key);
        }
        Err(e) => errors.push(e.to_string()),
    }
    match site_result {
        Ok(Some(uploaded)) => {
            ctx.rollbacks.register(uploaded.rollback);
            site_key = Some(uploaded.key);
        }
        Ok(None) => {}
        Err(e) => errors.push(format!("S3 site: {}", e)),
    }

    if !errors.is_empty() {
        return Err(ProvisionError::Upload(errors));
    }

    ctx.code_key = code_key;
    if let (Some(site), Some(key)) = (ctx.site.as_mut(), site_key) {
        site.archive_key = Some(key);
    }
    Ok(Transition::Next(Step::ExportResources))
}
