//! Lambda関数定義

use super::RoleDefinition;
use crate::error::{ManifestError, Result};
use crate::naming::logical_name;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_MEMORY_SIZE: u32 = 128;
pub const DEFAULT_TIMEOUT: u32 = 3;

/// Lambda関数定義
///
/// KDL形式：
/// ```kdl
/// function "hello" {
///     description "Says hello"
///     role "lambda-exec"
///     memory 256
///     timeout 10
///     depends-on "AssetsBucket"
///     environment {
///         GREETING "hi"
///     }
///     event-source "arn:aws:kinesis:us-east-1:123456789012:stream/events" starting-position="LATEST"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionSpec {
    /// 関数名（アダプタのルーティングパスにも使用）
    pub name: String,
    /// 既存のIAMロール名
    pub role: Option<String>,
    /// 新規作成するIAMロールの定義
    pub role_definition: Option<RoleDefinition>,
    pub memory_size: u32,
    pub timeout: u32,
    pub description: String,
    /// 依存するテンプレートリソースの論理ID
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub environment: BTreeMap<String, String>,
    #[serde(default)]
    pub event_sources: Vec<EventSourceMapping>,
}

impl Default for FunctionSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            role: None,
            role_definition: None,
            memory_size: DEFAULT_MEMORY_SIZE,
            timeout: DEFAULT_TIMEOUT,
            description: String::new(),
            depends_on: Vec::new(),
            environment: BTreeMap::new(),
            event_sources: Vec::new(),
        }
    }
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_role_definition(mut self, definition: RoleDefinition) -> Self {
        self.role_definition = Some(definition);
        self
    }

    /// Node.jsアダプタでエクスポートされるハンドラー名
    pub fn handler_name(&self) -> String {
        let mut name = logical_name(&self.name);
        if let Some(first) = name.get(..1) {
            let lower = first.to_ascii_lowercase();
            name.replace_range(..1, &lower);
        }
        name
    }

    /// テンプレート内の `AWS::Lambda::Function` の論理ID
    pub fn logical_id(&self) -> String {
        function_logical_id(&self.name)
    }

    /// ロールマップ上のキー（既存ロール名 or ロール定義の論理ID）
    pub fn role_key(&self) -> Option<String> {
        match (&self.role, &self.role_definition) {
            (Some(name), _) => Some(name.clone()),
            (None, Some(definition)) => Some(definition.logical_id()),
            (None, None) => None,
        }
    }

    /// ロール指定が「どちらか一方のみ」であることを確認
    pub fn check_role_config(&self) -> Result<()> {
        match (&self.role, &self.role_definition) {
            (Some(_), Some(_)) => Err(ManifestError::ConflictingRole(self.name.clone())),
            (None, None) => Err(ManifestError::MissingRole(self.name.clone())),
            _ => Ok(()),
        }
    }
}

/// 関数名から `AWS::Lambda::Function` の論理IDを導出
pub fn function_logical_id(function_name: &str) -> String {
    format!("{}Lambda", logical_name(function_name))
}

/// イベントソースマッピング（Kinesis / DynamoDB Streams / SQS）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSourceMapping {
    pub event_source_arn: String,
    pub starting_position: Option<String>,
    pub batch_size: Option<u32>,
}

impl EventSourceMapping {
    pub fn new(event_source_arn: impl Into<String>) -> Self {
        Self {
            event_source_arn: event_source_arn.into(),
            starting_position: None,
            batch_size: None,
        }
    }

    /// ARNのサービス部分（`kinesis`, `dynamodb`, `sqs` など）
    pub fn service(&self) -> Option<&str> {
        self.event_source_arn.split(':').nth(2)
    }
}
