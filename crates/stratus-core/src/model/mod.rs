//! モデル定義
//!
//! Stratusのサービスマニフェストを構成するデータモデルを定義します。

mod api;
mod function;
mod role;
mod service;
mod site;

// Re-exports
pub use api::*;
pub use function::*;
pub use role::*;
pub use service::*;
pub use site::*;
