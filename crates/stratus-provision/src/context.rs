//! ワークフロー全体で共有されるコンテキスト

use crate::rollback::RollbackRegistry;
use crate::settings::ProvisionSettings;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use stratus_build::Toolchain;
use stratus_cloud::{CloudSession, StackDescription};
use stratus_core::{ApiSpec, BuildSpec, FunctionSpec, RoleMap, SiteSpec};
use stratus_template::Template;

/// サイトの定義と、アップロード後のアーカイブキー
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub spec: SiteSpec,
    pub archive_key: Option<String>,
}

impl SiteContext {
    pub fn new(spec: SiteSpec) -> Self {
        Self {
            spec,
            archive_key: None,
        }
    }
}

/// 1回の `provision` 呼び出しの状態
///
/// 各ステップはこのコンテキストを可変参照で受け取り、結果を書き戻します。
/// テンプレートは実行ごとに1つだけで、ロールマップとコードキーは
/// エクスポート前に必ず設定されます。
pub struct WorkflowContext {
    pub noop: bool,
    /// サービス名（= スタック名）
    pub service_name: String,
    pub description: String,
    pub functions: Vec<FunctionSpec>,
    pub api: Option<ApiSpec>,
    pub site: Option<SiteContext>,
    pub build: BuildSpec,

    pub template: Template,
    pub roles: RoleMap,
    pub bucket: String,
    /// コードバンドルのキー（アップロード後に設定）
    pub code_key: Option<String>,

    pub session: CloudSession,
    pub toolchain: Arc<dyn Toolchain>,
    pub support_bundle: Option<PathBuf>,
    /// 一時ファイルを作成するディレクトリ
    pub work_dir: PathBuf,
    pub template_sink: Option<Box<dyn Write + Send>>,
    pub settings: ProvisionSettings,

    /// 収束後のスタック（live実行時のみ）
    pub stack: Option<StackDescription>,

    pub span: tracing::Span,
    pub rollbacks: RollbackRegistry,
}

impl WorkflowContext {
    /// 成功したアップロードなどの後始末を登録
    pub fn register_rollback(&mut self, action: crate::rollback::RollbackAction) {
        self.rollbacks.register(action);
    }
}

impl std::fmt::Debug for WorkflowContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkflowContext")
            .field("noop", &self.noop)
            .field("service_name", &self.service_name)
            .field("functions", &self.functions.len())
            .field("bucket", &self.bucket)
            .field("code_key", &self.code_key)
            .field("rollbacks", &self.rollbacks.len())
            .finish_non_exhaustive()
    }
}
