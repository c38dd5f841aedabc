//! Stratus コア
//!
//! サービスマニフェスト（`stratus.kdl`）のデータモデル、KDLパーサー、
//! およびCloudFormationテンプレートへのエクスポート処理を提供します。

pub mod error;
pub mod export;
pub mod model;
pub mod naming;
pub mod parser;

pub use error::{ExportError, ManifestError, Result};
pub use export::{Export, ExportContext, RoleMap};
pub use model::*;
pub use naming::{is_valid_stack_name, logical_name, sanitized_name};
pub use parser::{parse_manifest_file, parse_manifest_string};
