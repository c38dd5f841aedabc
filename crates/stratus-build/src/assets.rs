//! 埋め込みアセット
//!
//! アダプタのベースソースとカスタムリソース用スクリプトを、
//! パスをキーとした静的テーブルとしてバイナリに埋め込みます。

/// 埋め込みファイル
#[derive(Debug, Clone, Copy)]
pub struct Asset {
    /// `resources/` からの相対パス
    pub path: &'static str,
    pub contents: &'static str,
}

/// アダプタのベースソース
pub const ADAPTER_BASE: &str = "index.js";

const PROVISION_DIR: &str = "provision/";

static ASSETS: &[Asset] = &[
    Asset {
        path: "index.js",
        contents: include_str!("../resources/index.js"),
    },
    Asset {
        path: "provision/cfn-response.js",
        contents: include_str!("../resources/provision/cfn-response.js"),
    },
    Asset {
        path: "provision/stratus_utils.js",
        contents: include_str!("../resources/provision/stratus_utils.js"),
    },
    Asset {
        path: "provision/s3Site.js",
        contents: include_str!("../resources/provision/s3Site.js"),
    },
    Asset {
        path: "provision/apigateway/inputmapping_default.vtl",
        contents: include_str!("../resources/provision/apigateway/inputmapping_default.vtl"),
    },
    Asset {
        path: "provision/apigateway/inputmapping_json.vtl",
        contents: include_str!("../resources/provision/apigateway/inputmapping_json.vtl"),
    },
];

/// パッケージに同梱するスクリプト（アーカイブ内のパス）
pub const SUPPORT_SCRIPTS: &[&str] = &[
    "cfn-response.js",
    "stratus_utils.js",
    "s3Site.js",
    "apigateway/inputmapping_default.vtl",
    "apigateway/inputmapping_json.vtl",
];

/// パスから埋め込みファイルを取得
pub fn asset(path: &str) -> Option<&'static str> {
    let path = path.trim_start_matches('/');
    ASSETS
        .iter()
        .find(|asset| asset.path == path)
        .map(|asset| asset.contents)
}

/// 同梱スクリプトを (アーカイブ内パス, 内容) で列挙
pub fn support_scripts() -> impl Iterator<Item = (&'static str, &'static str)> {
    SUPPORT_SCRIPTS.iter().filter_map(|name| {
        let contents = asset(&format!("{}{}", PROVISION_DIR, name));
        if contents.is_none() {
            tracing::warn!("Embedded script missing: {}", name);
        }
        contents.map(|contents| (*name, contents))
    })
}
