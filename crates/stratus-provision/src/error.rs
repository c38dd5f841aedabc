use stratus_build::BuildError;
use stratus_cloud::CloudError;
use stratus_core::{ExportError, ManifestError};
use stratus_template::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("Build failed: {0}")]
    Build(#[from] BuildError),

    #[error("Cloud error: {0}")]
    Cloud(#[from] CloudError),

    #[error("Failed to ensure bucket policies: {0}")]
    BucketPolicy(String),

    #[error("Upload failed: {}", .0.join("; "))]
    Upload(Vec<String>),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Failed to provision: {0}")]
    StackFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ProvisionError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            ProvisionError::Build(e) => e.user_message(),
            ProvisionError::Cloud(CloudError::AuthenticationFailed(msg)) => {
                format!(
                    "AWS認証に失敗しました: {}\n\
                     \n\
                     AWS_PROFILE または AWS_ACCESS_KEY_ID / AWS_SECRET_ACCESS_KEY を確認してください。",
                    msg
                )
            }
            ProvisionError::StackFailed(service) => {
                format!(
                    "スタックのプロビジョニングに失敗しました: {}\n\
                     \n\
                     失敗したリソースは上のログに出力されています。",
                    service
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
