use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("設定ディレクトリが見つかりません")]
    ConfigDirNotFound,

    #[error(
        "マニフェストが見つかりません。以下の場所を確認してください:\n\
        - カレントディレクトリ: stratus.local.kdl, .stratus.local.kdl, stratus.kdl, .stratus.kdl\n\
        - ./.stratus/ ディレクトリ\n\
        - ~/.config/stratus/stratus.kdl\n\
        または STRATUS_MANIFEST_PATH 環境変数で直接指定できます"
    )]
    ManifestNotFound,

    #[error("STRATUS_MANIFEST_PATH が存在しないファイルを指しています: {0}")]
    ManifestPathNotFound(PathBuf),

    #[error("IO エラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
