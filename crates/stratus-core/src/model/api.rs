//! API Gateway定義

use serde::{Deserialize, Serialize};

pub const DEFAULT_STAGE: &str = "prod";

/// REST API定義
///
/// KDL形式：
/// ```kdl
/// api "demo-api" {
///     stage "v1"
///     resource "/hello" function="hello" {
///         method "GET" "POST"
///     }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSpec {
    pub name: String,
    pub stage: String,
    pub description: String,
    #[serde(default)]
    pub resources: Vec<ApiResource>,
}

impl ApiSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stage: DEFAULT_STAGE.to_string(),
            description: String::new(),
            resources: Vec::new(),
        }
    }
}

/// パスと関数の対応
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResource {
    pub path: String,
    /// 呼び出す関数名
    pub function: String,
    /// HTTPメソッド（未指定時は GET）
    #[serde(default)]
    pub methods: Vec<String>,
}

impl ApiResource {
    pub fn new(path: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            function: function.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// 実際に公開するメソッド（大文字化済み）
    pub fn effective_methods(&self) -> Vec<String> {
        if self.methods.is_empty() {
            vec!["GET".to_string()]
        } else {
            self.methods.iter().map(|m| m.to_ascii_uppercase()).collect()
        }
    }

    /// 先頭・末尾の `/` を除いたパスセグメント
    pub fn segments(&self) -> Vec<&str> {
        self.path.split('/').filter(|s| !s.is_empty()).collect()
    }
}
