//! ワークフローの各ステップ

pub mod converge;
pub mod export;
pub mod package;
pub mod roles;
pub mod upload;
