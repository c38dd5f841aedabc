//! テンプレートへのエクスポート
//!
//! マニフェストの各要素（関数・API・サイト）を CloudFormation テンプレートの
//! リソースとして書き出します。

mod api;
mod function;
mod site;

pub use api::API_GATEWAY_URL_OUTPUT;
pub use site::{S3_SITE_URL_OUTPUT, SITE_HANDLER};

use crate::error::ExportError;
use std::collections::{BTreeMap, HashMap};
use stratus_template::{Expr, Output, Template, TemplateError};

/// Lambda関数のランタイム（Node.jsアダプタ経由でバイナリを起動）
pub const NODE_RUNTIME: &str = "nodejs20.x";

/// ロール名 / ロール定義の論理ID → ロールARNの参照
pub type RoleMap = HashMap<String, Expr>;

/// エクスポート時に共有される情報
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub service_name: &'a str,
    /// コードバンドルを格納したバケット
    pub bucket: &'a str,
    /// コードバンドルのキー
    pub code_key: &'a str,
    pub roles: &'a RoleMap,
    /// サイトアーカイブのキー（サイトのエクスポート時のみ）
    pub site_archive_key: Option<&'a str>,
    /// APIのエクスポートで生成されたOutputs（サイトのエクスポート時のみ）
    pub api_outputs: Option<&'a BTreeMap<String, Output>>,
}

impl<'a> ExportContext<'a> {
    pub fn new(
        service_name: &'a str,
        bucket: &'a str,
        code_key: &'a str,
        roles: &'a RoleMap,
    ) -> Self {
        Self {
            service_name,
            bucket,
            code_key,
            roles,
            site_archive_key: None,
            api_outputs: None,
        }
    }

    pub fn with_site_archive(mut self, key: &'a str) -> Self {
        self.site_archive_key = Some(key);
        self
    }

    pub fn with_api_outputs(mut self, outputs: &'a BTreeMap<String, Output>) -> Self {
        self.api_outputs = Some(outputs);
        self
    }
}

/// テンプレートへ自身のリソースを書き出す
pub trait Export {
    fn export(&self, ctx: &ExportContext<'_>, template: &mut Template)
    -> Result<(), ExportError>;
}

/// 論理IDの重複を検出して追加
fn insert_unique(
    template: &mut Template,
    logical_id: String,
    resource: stratus_template::Resource,
) -> Result<(), ExportError> {
    if template.contains_resource(&logical_id) {
        return Err(TemplateError::DuplicateResource(logical_id).into());
    }
    template.add_resource(logical_id, resource);
    Ok(())
}
