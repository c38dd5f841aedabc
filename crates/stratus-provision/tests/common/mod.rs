#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use stratus_build::{BuildError, CompileRequest, Toolchain};
use stratus_cloud::{
    CloudError, CloudSession, CreateStackRequest, LifecycleRule, ObjectBody, ObjectStore,
    RoleDirectory, StackDescription, StackEvent, StackEventPage, StackOutput, StackService,
    UpdateStackRequest, UploadReceipt,
};
use stratus_core::{FunctionSpec, Privilege, RoleDefinition};
use stratus_provision::{PollPolicy, ProvisionOptions, ProvisionSettings};
use tempfile::TempDir;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

/// 呼び出しを記録するオブジェクトストア
#[derive(Default)]
pub struct FakeObjectStore {
    pub lifecycle_calls: AtomicUsize,
    pub puts: Mutex<Vec<String>>,
    pub deletes: Mutex<Vec<String>>,
    /// trueを返すキーのアップロードを失敗させる
    pub reject_key: Option<fn(&str) -> bool>,
    pub lifecycle: Option<Vec<LifecycleRule>>,
    /// ライフサイクル取得時に返すAPIエラー
    pub lifecycle_error: Option<String>,
}

impl FakeObjectStore {
    pub fn put_count(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn delete_count(&self) -> usize {
        self.deletes.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn lifecycle_rules(&self, bucket: &str) -> stratus_cloud::Result<Vec<LifecycleRule>> {
        self.lifecycle_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(message) = &self.lifecycle_error {
            return Err(CloudError::ApiError(message.clone()));
        }
        self.lifecycle
            .clone()
            .ok_or_else(|| CloudError::LifecycleConfigurationNotFound(bucket.to_string()))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        _body: ObjectBody,
        _content_type: &str,
    ) -> stratus_cloud::Result<UploadReceipt> {
        if let Some(reject) = self.reject_key
            && reject(key)
        {
            return Err(CloudError::ApiError(format!("upload rejected: {}", key)));
        }
        self.puts.lock().unwrap().push(key.to_string());
        Ok(UploadReceipt {
            bucket: bucket.to_string(),
            key: key.to_string(),
            location: format!("https://{}.s3.amazonaws.com/{}", bucket, key),
        })
    }

    async fn delete_object(&self, _bucket: &str, key: &str) -> stratus_cloud::Result<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        Ok(())
    }
}

/// 既存ロールのディレクトリ
#[derive(Default)]
pub struct FakeRoles {
    pub lookups: Mutex<Vec<String>>,
    pub missing: Vec<String>,
}

impl FakeRoles {
    pub fn lookup_count(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }
}

#[async_trait]
impl RoleDirectory for FakeRoles {
    async fn role_arn(&self, role_name: &str) -> stratus_cloud::Result<String> {
        self.lookups.lock().unwrap().push(role_name.to_string());
        if self.missing.iter().any(|name| name == role_name) {
            return Err(CloudError::ResourceNotFound(role_name.to_string()));
        }
        Ok(format!("arn:aws:iam::123456789012:role/{}", role_name))
    }
}

/// スタックサービス
///
/// `statuses` は作成・更新後の describe で順に返す状態です。
#[derive(Default)]
pub struct FakeStacks {
    pub exists: bool,
    pub statuses: Mutex<VecDeque<String>>,
    pub events: Vec<StackEventPage>,
    pub describes: AtomicUsize,
    pub creates: Mutex<Vec<CreateStackRequest>>,
    pub updates: Mutex<Vec<UpdateStackRequest>>,
    pub event_requests: Mutex<Vec<Option<String>>>,
}

impl FakeStacks {
    pub fn with_statuses(exists: bool, statuses: &[&str]) -> Self {
        Self {
            exists,
            statuses: Mutex::new(statuses.iter().map(|s| s.to_string()).collect()),
            ..Default::default()
        }
    }

    pub fn mutation_count(&self) -> usize {
        self.creates.lock().unwrap().len() + self.updates.lock().unwrap().len()
    }

    fn started(&self) -> bool {
        self.mutation_count() > 0
    }
}

#[async_trait]
impl StackService for FakeStacks {
    async fn describe_stack(&self, stack_name_or_id: &str) -> stratus_cloud::Result<StackDescription> {
        self.describes.fetch_add(1, Ordering::SeqCst);
        if !self.started() && !self.exists {
            return Err(CloudError::ResourceNotFound(stack_name_or_id.to_string()));
        }

        let status = if self.started() {
            self.statuses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "CREATE_COMPLETE".to_string())
        } else {
            "UPDATE_COMPLETE".to_string()
        };

        Ok(StackDescription {
            stack_id: format!("arn:aws:cloudformation:us-east-1:123456789012:stack/{}", stack_name_or_id),
            stack_name: "demo".to_string(),
            status,
            status_reason: None,
            outputs: vec![StackOutput {
                key: "StratusVersion".to_string(),
                value: "0.0.0".to_string(),
                description: None,
            }],
            creation_time: chrono::DateTime::from_timestamp(1_700_000_000, 0),
        })
    }

    async fn create_stack(&self, request: &CreateStackRequest) -> stratus_cloud::Result<String> {
        self.creates.lock().unwrap().push(request.clone());
        Ok(request.stack_name.clone())
    }

    async fn update_stack(&self, request: &UpdateStackRequest) -> stratus_cloud::Result<String> {
        self.updates.lock().unwrap().push(request.clone());
        Ok(request.stack_name.clone())
    }

    async fn describe_stack_events(
        &self,
        _stack_id: &str,
        next_token: Option<&str>,
    ) -> stratus_cloud::Result<StackEventPage> {
        self.event_requests
            .lock()
            .unwrap()
            .push(next_token.map(str::to_string));
        let index = next_token.and_then(|t| t.parse::<usize>().ok()).unwrap_or(0);
        Ok(self.events.get(index).cloned().unwrap_or_default())
    }
}

pub fn failed_event(logical_id: &str, status: &str) -> StackEvent {
    StackEvent {
        logical_resource_id: logical_id.to_string(),
        resource_type: "AWS::Lambda::Function".to_string(),
        resource_status: status.to_string(),
        status_reason: Some("Resource creation cancelled".to_string()),
        timestamp: None,
    }
}

/// 出力先に固定バイト列を書き込むツールチェーン
#[derive(Default)]
pub struct FakeToolchain {
    pub compiles: AtomicUsize,
    pub fail: bool,
}

#[async_trait]
impl Toolchain for FakeToolchain {
    async fn compile(&self, request: &CompileRequest) -> stratus_build::Result<()> {
        self.compiles.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(BuildError::CompilationFailed("error[E0308]: mismatched types".to_string()));
        }
        std::fs::write(&request.output, b"\x7fELF fake binary")?;
        Ok(())
    }
}

/// テンプレートの書き出し先（テストから内容を読める）
#[derive(Clone, Default)]
pub struct SharedSink(pub Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    pub fn contents(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.contents()).unwrap()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// fakeを組み合わせたテスト環境
pub struct Harness {
    pub work_dir: TempDir,
    pub store: Arc<FakeObjectStore>,
    pub roles: Arc<FakeRoles>,
    pub stacks: Arc<FakeStacks>,
    pub toolchain: Arc<FakeToolchain>,
    pub sink: SharedSink,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_fakes(FakeObjectStore::default(), FakeRoles::default(), FakeStacks::default())
    }

    pub fn with_fakes(store: FakeObjectStore, roles: FakeRoles, stacks: FakeStacks) -> Self {
        Self {
            work_dir: tempfile::tempdir().unwrap(),
            store: Arc::new(store),
            roles: Arc::new(roles),
            stacks: Arc::new(stacks),
            toolchain: Arc::new(FakeToolchain::default()),
            sink: SharedSink::default(),
        }
    }

    pub fn with_toolchain(mut self, toolchain: FakeToolchain) -> Self {
        self.toolchain = Arc::new(toolchain);
        self
    }

    pub fn session(&self) -> CloudSession {
        CloudSession::new(self.store.clone(), self.roles.clone(), self.stacks.clone())
    }

    pub fn options(&self, service: &str, functions: Vec<FunctionSpec>) -> ProvisionOptions {
        ProvisionOptions::new(service, "artifacts", functions, self.session())
            .with_toolchain(self.toolchain.clone())
            .with_work_dir(self.work_dir.path())
            .with_template_sink(Box::new(self.sink.clone()))
            .with_settings(ProvisionSettings {
                poll: PollPolicy::Fixed(Duration::ZERO),
                rollback_timeout: Duration::from_secs(5),
                ..Default::default()
            })
    }

    /// 作業ディレクトリに残ったファイル
    pub fn leftover_files(&self) -> Vec<String> {
        std::fs::read_dir(self.work_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect()
    }
}

/// サイトアーカイブのキー
pub fn is_site_key(key: &str) -> bool {
    key.contains("-S3Site-")
}

/// サイトアーカイブ以外のキー
pub fn is_code_key(key: &str) -> bool {
    !is_site_key(key)
}

/// aws-sdkとadm-zipを含むサポートバンドルを作成
pub fn write_support_bundle(dir: &Path) -> PathBuf {
    let path = dir.join("node_modules.zip");
    let mut zip = ZipWriter::new(std::fs::File::create(&path).unwrap());
    for module in ["aws-sdk", "adm-zip"] {
        zip.start_file(
            format!("node_modules/{}/index.js", module),
            SimpleFileOptions::default(),
        )
        .unwrap();
        zip.write_all(b"module.exports = {};\n").unwrap();
    }
    zip.finish().unwrap();
    path
}

pub fn s3_read_definition() -> RoleDefinition {
    RoleDefinition::default().with_privilege(Privilege::new(["s3:GetObject"], "arn:aws:s3:::data/*"))
}

pub fn queue_definition() -> RoleDefinition {
    RoleDefinition::default().with_privilege(Privilege::new(["sqs:SendMessage"], "*"))
}
