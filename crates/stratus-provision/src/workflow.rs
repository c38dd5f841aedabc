//! プロビジョニングのステートマシン

use crate::context::{SiteContext, WorkflowContext};
use crate::error::{ProvisionError, Result};
use crate::rollback::RollbackRegistry;
use crate::settings::ProvisionSettings;
use crate::steps;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use stratus_build::{CargoToolchain, PackagedArchive, Toolchain};
use stratus_cloud::CloudSession;
use stratus_core::{
    ApiSpec, BuildSpec, FunctionSpec, RoleMap, ServiceManifest, SiteSpec, is_valid_stack_name,
};
use stratus_template::Template;
use tracing::Instrument;

/// ワークフローのステップ
#[derive(Debug)]
pub enum Step {
    /// IAMロールの検証・テンプレートへの追加
    VerifyRoles,
    /// バイナリのビルドとZIP化
    Package,
    /// アーカイブのアップロード
    Upload { archive: PackagedArchive },
    /// テンプレートの合成
    ExportResources,
    /// スタックの作成・更新
    Converge,
}

impl Step {
    /// ステップの表示名
    pub fn name(&self) -> &'static str {
        match self {
            Step::VerifyRoles => "Verifying IAM roles",
            Step::Package => "Creating code bundle",
            Step::Upload { .. } => "Uploading code bundle",
            Step::ExportResources => "Exporting resources",
            Step::Converge => "Converging stack",
        }
    }
}

/// ステップの実行結果
#[derive(Debug)]
pub enum Transition {
    Next(Step),
    Complete,
}

/// `provision` への入力
pub struct ProvisionOptions {
    pub noop: bool,
    pub service_name: String,
    pub description: String,
    pub functions: Vec<FunctionSpec>,
    pub api: Option<ApiSpec>,
    pub site: Option<SiteSpec>,
    pub bucket: String,
    pub build: BuildSpec,
    /// 生成したテンプレートの書き出し先
    pub template_sink: Option<Box<dyn Write + Send>>,
    pub session: CloudSession,
    pub toolchain: Arc<dyn Toolchain>,
    pub support_bundle: Option<PathBuf>,
    pub work_dir: PathBuf,
    pub settings: ProvisionSettings,
}

impl ProvisionOptions {
    pub fn new(
        service_name: impl Into<String>,
        bucket: impl Into<String>,
        functions: Vec<FunctionSpec>,
        session: CloudSession,
    ) -> Self {
        Self {
            noop: false,
            service_name: service_name.into(),
            description: String::new(),
            functions,
            api: None,
            site: None,
            bucket: bucket.into(),
            build: BuildSpec::default(),
            template_sink: None,
            session,
            toolchain: Arc::new(CargoToolchain::new()),
            support_bundle: None,
            work_dir: std::env::temp_dir(),
            settings: ProvisionSettings::default(),
        }
    }

    /// マニフェストから組み立てる
    ///
    /// `bucket` はマニフェストの値より優先されます。
    pub fn from_manifest(
        manifest: &ServiceManifest,
        bucket: Option<String>,
        session: CloudSession,
    ) -> Result<Self> {
        let bucket = bucket.or_else(|| manifest.bucket.clone()).ok_or_else(|| {
            ProvisionError::Config(format!(
                "No S3 bucket configured for service '{}'",
                manifest.name
            ))
        })?;

        let mut options = Self::new(&manifest.name, bucket, manifest.functions.clone(), session);
        options.description = manifest.description.clone();
        options.api = manifest.api.clone();
        options.site = manifest.site.clone();
        options.build = manifest.build.clone();
        Ok(options)
    }

    pub fn with_noop(mut self, noop: bool) -> Self {
        self.noop = noop;
        self
    }

    pub fn with_template_sink(mut self, sink: Box<dyn Write + Send>) -> Self {
        self.template_sink = Some(sink);
        self
    }

    pub fn with_toolchain(mut self, toolchain: Arc<dyn Toolchain>) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn with_support_bundle(mut self, path: impl Into<PathBuf>) -> Self {
        self.support_bundle = Some(path.into());
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_settings(mut self, settings: ProvisionSettings) -> Self {
        self.settings = settings;
        self
    }

    fn into_context(self) -> WorkflowContext {
        let span = tracing::info_span!(
            "provision",
            service = %self.service_name,
            noop = self.noop
        );

        WorkflowContext {
            noop: self.noop,
            template: Template::new(self.description.clone()),
            service_name: self.service_name,
            description: self.description,
            functions: self.functions,
            api: self.api,
            site: self.site.map(SiteContext::new),
            build: self.build,
            roles: RoleMap::new(),
            bucket: self.bucket,
            code_key: None,
            session: self.session,
            toolchain: self.toolchain,
            support_bundle: self.support_bundle,
            work_dir: self.work_dir,
            template_sink: self.template_sink,
            settings: self.settings,
            stack: None,
            span,
            rollbacks: RollbackRegistry::new(),
        }
    }
}

/// サービスをプロビジョニング
///
/// `VerifyRoles → Package → Upload → ExportResources → Converge` の順に実行し、
/// いずれかが失敗した場合は登録済みのロールバックを実行してからエラーを返します。
pub async fn provision(options: ProvisionOptions) -> Result<()> {
    if options.functions.is_empty() {
        return Err(ProvisionError::Config(
            "No lambda functions provided to Stratus provision".to_string(),
        ));
    }
    if !is_valid_stack_name(&options.service_name) {
        return Err(ProvisionError::Config(format!(
            "Service name is not a valid stack name: {}",
            options.service_name
        )));
    }
    // s3Siteカスタムリソースはaws-sdkとadm-zipを同梱バンドルから読み込む
    if options.site.is_some() && options.support_bundle.is_none() {
        return Err(ProvisionError::Config(
            "S3 site requires a support bundle providing aws-sdk and adm-zip".to_string(),
        ));
    }

    let mut ctx = options.into_context();
    let span = ctx.span.clone();
    let started = Instant::now();

    let outcome = run(&mut ctx).instrument(span.clone()).await;

    match outcome {
        Ok(()) => {
            let _entered = span.enter();
            tracing::info!("Elapsed time: {:.2}s", started.elapsed().as_secs_f64());
            Ok(())
        }
        Err(e) => {
            let rollbacks = std::mem::take(&mut ctx.rollbacks);
            let timeout = ctx.settings.rollback_timeout;
            rollbacks.run(timeout).instrument(span.clone()).await;

            let _entered = span.enter();
            tracing::error!("Provisioning failed: {}", e);
            Err(e)
        }
    }
}

async fn run(ctx: &mut WorkflowContext) -> Result<()> {
    let mut step = Step::VerifyRoles;
    loop {
        tracing::info!("{}", step.name());
        let transition = match step {
            Step::VerifyRoles => steps::roles::verify_roles(ctx).await?,
            Step::Package => steps::package::create_package(ctx).await?,
            Step::Upload { archive } => steps::upload::upload_packages(ctx, archive).await?,
            Step::ExportResources => steps::export::export_resources(ctx)?,
            Step::Converge => steps::converge::converge_stack(ctx).await?,
        };

        match transition {
            Transition::Next(next) => step = next,
            Transition::Complete => return Ok(()),
        }
    }
}
