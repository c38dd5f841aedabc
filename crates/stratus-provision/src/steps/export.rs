//! テンプレートの合成

use crate::context::WorkflowContext;
use crate::error::{ProvisionError, Result};
use crate::workflow::{Step, Transition};
use serde_json::Value;
use stratus_core::{Export, ExportContext};
use stratus_template::{Expr, Output, Template, outputs_for_resource, pseudo, resource_types};

pub const STRATUS_HOME: &str = "https://github.com/stratus-deploy/stratus";
pub const STRATUS_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HOME_OUTPUT: &str = "StratusHome";
pub const VERSION_OUTPUT: &str = "StratusVersion";

pub const STACK_REGION_METADATA: &str = "stratus:StackRegion";
pub const STACK_ID_METADATA: &str = "stratus:StackId";
pub const STACK_NAME_METADATA: &str = "stratus:StackName";

/// 関数・API・サイトをテンプレートに書き出し、メタデータを付与
pub fn export_resources(ctx: &mut WorkflowContext) -> Result<Transition> {
    let code_key = ctx
        .code_key
        .as_deref()
        .ok_or_else(|| ProvisionError::Config("Code bundle has not been uploaded".to_string()))?;
    let export_ctx = ExportContext::new(&ctx.service_name, &ctx.bucket, code_key, &ctx.roles);

    for function in &ctx.functions {
        function.export(&export_ctx, &mut ctx.template)?;
    }

    let mut api_outputs = None;
    if let Some(api) = &ctx.api {
        let mut scratch = Template::default();
        api.export(&export_ctx, &mut scratch)?;
        api_outputs = Some(scratch.outputs.clone());
        ctx.template.merge(scratch)?;
    }

    if let Some(site) = &ctx.site {
        let archive_key = site.archive_key.as_deref().ok_or_else(|| {
            ProvisionError::Config("S3 site archive has not been uploaded".to_string())
        })?;
        let mut site_ctx = export_ctx.with_site_archive(archive_key);
        if let Some(outputs) = &api_outputs {
            site_ctx = site_ctx.with_api_outputs(outputs);
        }
        site.spec.export(&site_ctx, &mut ctx.template)?;
    }

    add_stratus_outputs(&mut ctx.template);
    annotate_functions(&mut ctx.template);

    tracing::debug!(
        "Template synthesized: {} resources, {} outputs",
        ctx.template.resources.len(),
        ctx.template.outputs.len()
    );
    Ok(Transition::Next(Step::Converge))
}

/// 固定のOutputs（常に上書き）
pub fn add_stratus_outputs(template: &mut Template) {
    template.add_output(
        HOME_OUTPUT,
        Output::new("Stratus Home", Expr::string(STRATUS_HOME)),
    );
    template.add_output(
        VERSION_OUTPUT,
        Output::new("Stratus Version", Expr::string(STRATUS_VERSION)),
    );
}

/// 各Lambda関数のメタデータに依存リソースのOutputsとスタック情報を追加
///
/// 既存のキーは上書きしません。
pub fn annotate_functions(template: &mut Template) {
    for logical_id in template.logical_ids_of_type(resource_types::LAMBDA_FUNCTION) {
        let Some(resource) = template.resource(&logical_id) else {
            continue;
        };

        let dependency_outputs: Vec<(String, Value)> = resource
            .depends_on
            .iter()
            .filter_map(|dependency| {
                let outputs = outputs_for_resource(template, dependency)?;
                let value: serde_json::Map<String, Value> = outputs
                    .into_iter()
                    .map(|(name, expr)| (name, expr.to_value()))
                    .collect();
                Some((dependency.clone(), Value::Object(value)))
            })
            .collect();

        let Some(resource) = template.resource_mut(&logical_id) else {
            continue;
        };
        for (dependency, outputs) in dependency_outputs {
            tracing::debug!("Adding {} outputs to {} metadata", dependency, logical_id);
            resource.insert_metadata(dependency, outputs);
        }
        resource.insert_metadata(STACK_REGION_METADATA, Expr::reference(pseudo::REGION));
        resource.insert_metadata(STACK_ID_METADATA, Expr::reference(pseudo::STACK_ID));
        resource.insert_metadata(STACK_NAME_METADATA, Expr::reference(pseudo::STACK_NAME));
    }
}
