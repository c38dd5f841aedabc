//! コードバンドルの作成

use crate::context::WorkflowContext;
use crate::error::Result;
use crate::workflow::{Step, Transition};
use stratus_build::PackageRequest;

pub async fn create_package(ctx: &mut WorkflowContext) -> Result<Transition> {
    let request = PackageRequest {
        service_name: &ctx.service_name,
        functions: &ctx.functions,
        build: &ctx.build,
        work_dir: &ctx.work_dir,
        support_bundle: ctx.support_bundle.as_deref(),
    };
    let archive = stratus_build::package(ctx.toolchain.as_ref(), &request).await?;

    tracing::info!("Code bundle created: {}", archive.path.display());
    Ok(Transition::Next(Step::Upload { archive }))
}
