//! IAMロールの検証

use crate::context::WorkflowContext;
use crate::error::Result;
use crate::workflow::{Step, Transition};
use stratus_template::Expr;

/// 関数ごとのロールを解決し、ロールマップを埋める
///
/// - 既存ロール名: リモートで一度だけARNを取得
/// - ロール定義: `AWS::IAM::Role` リソースを追加し `GetAtt Arn` を記録
///
/// ロール指定の検証は全関数分を先に行い、失敗した場合は何も変更しません。
pub async fn verify_roles(ctx: &mut WorkflowContext) -> Result<Transition> {
    for function in &ctx.functions {
        function.check_role_config()?;
    }

    for function in &ctx.functions {
        if let Some(role_name) = &function.role {
            if ctx.roles.contains_key(role_name) {
                continue;
            }
            let arn = ctx.session.roles.role_arn(role_name).await?;
            tracing::debug!("Found IAM role: {} -> {}", role_name, arn);
            ctx.roles.insert(role_name.clone(), Expr::string(arn));
        } else if let Some(definition) = &function.role_definition {
            let logical_id = definition.logical_id();
            if ctx.roles.contains_key(&logical_id) {
                continue;
            }
            tracing::debug!("Inserting IAM role: {}", logical_id);
            ctx.template.add_resource(
                logical_id.clone(),
                definition.to_resource(&function.event_sources),
            );
            ctx.roles
                .insert(logical_id.clone(), Expr::get_att(logical_id, "Arn"));
        }
    }

    tracing::info!("IAM roles verified: {}", ctx.roles.len());
    Ok(Transition::Next(Step::Package))
}
