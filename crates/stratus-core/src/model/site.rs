//! S3静的サイト定義

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// S3静的サイト
///
/// KDL形式：
/// ```kdl
/// site "./public" bucket-name="demo-site"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteSpec {
    /// サイトのルートディレクトリ
    pub resources_dir: PathBuf,
    /// バケット名（未指定時はCloudFormationが命名）
    pub bucket_name: Option<String>,
    pub index_document: String,
    pub error_document: String,
}

impl SiteSpec {
    pub fn new(resources_dir: impl Into<PathBuf>) -> Self {
        Self {
            resources_dir: resources_dir.into(),
            bucket_name: None,
            index_document: "index.html".to_string(),
            error_document: "error.html".to_string(),
        }
    }
}
