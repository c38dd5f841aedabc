use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Project directory not found: {0}")]
    ProjectNotFound(PathBuf),

    #[error("Toolchain not available: {0}")]
    ToolchainNotFound(String),

    #[error("Compilation failed: {0}")]
    CompilationFailed(String),

    #[error("Build output not found: {0}")]
    OutputNotFound(PathBuf),

    #[error("Site directory not found: {0}")]
    SiteNotFound(PathBuf),

    #[error("Support bundle error: {path}: {message}")]
    SupportBundle { path: PathBuf, message: String },

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid build configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// ユーザー向けの分かりやすいエラーメッセージ
    pub fn user_message(&self) -> String {
        match self {
            BuildError::ToolchainNotFound(program) => {
                format!(
                    "ビルドツールが見つかりません: {}\n\
                     \n\
                     解決方法:\n\
                     1. cargo がインストールされているか確認してください\n\
                     2. ターゲットを追加してください:\n\
                        rustup target add x86_64-unknown-linux-musl",
                    program
                )
            }
            BuildError::CompilationFailed(msg) => {
                format!(
                    "コンパイルに失敗しました: {}\n\
                     \n\
                     lambda-binary フィーチャーが定義されているか確認してください。",
                    msg
                )
            }
            BuildError::ProjectNotFound(path) => {
                format!(
                    "プロジェクトが見つかりません: {}\n\
                     \n\
                     stratus.kdl の build.project-dir を確認してください。",
                    path.display()
                )
            }
            BuildError::SiteNotFound(path) => {
                format!(
                    "サイトディレクトリが見つかりません: {}\n\
                     \n\
                     stratus.kdl の site ノードのパスを確認してください。",
                    path.display()
                )
            }
            _ => format!("{}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, BuildError>;
