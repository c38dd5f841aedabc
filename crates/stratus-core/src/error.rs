use std::path::PathBuf;
use stratus_template::TemplateError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("KDLパースエラー: {0}")]
    KdlParse(#[from] kdl::KdlError),

    #[error("ファイル読み込みエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("IO エラー: {path}\n理由: {message}")]
    IoError { path: PathBuf, message: String },

    #[error("無効な設定: {0}")]
    InvalidConfig(String),

    #[error("関数が重複しています: {0}")]
    DuplicateFunction(String),

    #[error("関数が見つかりません: {0}")]
    FunctionNotFound(String),

    #[error("関数 '{0}' に role と role-definition の両方が指定されています")]
    ConflictingRole(String),

    #[error("関数 '{0}' に role も role-definition も指定されていません")]
    MissingRole(String),
}

pub type Result<T> = std::result::Result<T, ManifestError>;

/// テンプレートへのエクスポート時のエラー
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("No IAM role resolved for function: {0}")]
    UnresolvedRole(String),

    #[error("Site archive key is not set")]
    MissingSiteArchive,

    #[error("Invalid export configuration: {0}")]
    InvalidConfig(String),
}
