//! スタックの作成・更新と完了待ち

use crate::context::WorkflowContext;
use crate::error::{ProvisionError, Result};
use crate::poll::PollPolicy;
use crate::rollback::RollbackAction;
use crate::workflow::Transition;
use sha2::{Digest, Sha256};
use std::io::Write;
use stratus_cloud::{
    CAPABILITY_IAM, CreateStackRequest, ObjectBody, OnFailure, StackDescription, StackService,
    StatusClass, UpdateStackRequest,
};
use stratus_core::sanitized_name;
use stratus_template::{Template, resource_types};

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// テンプレート本文から決まるS3キー
pub fn template_key(service_name: &str, canonical_json: &str) -> String {
    let hash = format!("{:x}", Sha256::digest(canonical_json.as_bytes()));
    format!("{}-{}-cf.json", sanitized_name(service_name), hash)
}

/// 必要なケーパビリティ（IAMロールを含む場合のみ `CAPABILITY_IAM`）
pub fn capabilities(template: &Template) -> Vec<String> {
    if template.has_resource_type(resource_types::IAM_ROLE) {
        vec![CAPABILITY_IAM.to_string()]
    } else {
        Vec::new()
    }
}

/// テンプレートをアップロードし、スタックを作成または更新する
pub async fn converge_stack(ctx: &mut WorkflowContext) -> Result<Transition> {
    let canonical = ctx.template.to_canonical_json()?;
    let key = template_key(&ctx.service_name, &canonical);

    if let Some(sink) = ctx.template_sink.as_mut() {
        let pretty = ctx.template.to_pretty_json()?;
        sink.write_all(pretty.as_bytes())?;
        sink.write_all(b"\n")?;
        sink.flush()?;
    }

    if ctx.noop {
        tracing::info!(
            "Bypassing template upload & creation due to -n/--noop: s3://{}/{}",
            ctx.bucket,
            key
        );
        return Ok(Transition::Complete);
    }

    let store = ctx.session.object_store.clone();
    let receipt = store
        .put_object(
            &ctx.bucket,
            &key,
            ObjectBody::Bytes(canonical.into_bytes()),
            JSON_CONTENT_TYPE,
        )
        .await?;
    let rollback = RollbackAction::delete_object(store, ctx.bucket.as_str(), key.as_str(), false);
    ctx.register_rollback(rollback);
    tracing::info!("Template uploaded: {}", receipt.location);

    let stacks = ctx.session.stacks.clone();
    let capabilities = capabilities(&ctx.template);
    let exists = stack_exists(stacks.as_ref(), &ctx.service_name).await?;

    let (stack_id, operation) = if exists {
        tracing::info!("Updating stack: {}", ctx.service_name);
        let request = UpdateStackRequest {
            stack_name: ctx.service_name.clone(),
            template_url: receipt.location,
            capabilities,
        };
        (stacks.update_stack(&request).await?, "UpdateStack")
    } else {
        tracing::info!("Creating stack: {}", ctx.service_name);
        let request = CreateStackRequest {
            stack_name: ctx.service_name.clone(),
            template_url: receipt.location,
            capabilities,
            timeout_minutes: ctx.settings.create_timeout_minutes,
            on_failure: OnFailure::Delete,
        };
        (stacks.create_stack(&request).await?, "CreateStack")
    };
    tracing::debug!("{} stack id: {}", operation, stack_id);

    let description =
        wait_for_stack(stacks.as_ref(), &stack_id, ctx.settings.poll, operation).await?;
    if description.status_class() == StatusClass::Failed {
        log_failed_events(stacks.as_ref(), &stack_id).await;
        return Err(ProvisionError::StackFailed(ctx.service_name.clone()));
    }

    for output in &description.outputs {
        tracing::info!("Stack output: {} = {}", output.key, output.value);
    }
    tracing::info!(
        stack_name = %description.stack_name,
        stack_id = %description.stack_id,
        created = ?description.creation_time,
        "Stack provisioned"
    );

    ctx.stack = Some(description);
    Ok(Transition::Complete)
}

/// スタックが存在するか
///
/// 「存在しない」と分類されたエラーのみ `false` とし、それ以外は失敗です。
pub async fn stack_exists(stacks: &dyn StackService, stack_name: &str) -> Result<bool> {
    match stacks.describe_stack(stack_name).await {
        Ok(description) => {
            tracing::debug!("Stack {} exists: {}", stack_name, description.status);
            Ok(true)
        }
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// 終了状態になるまでポーリング
pub async fn wait_for_stack(
    stacks: &dyn StackService,
    stack_id: &str,
    policy: PollPolicy,
    operation: &str,
) -> Result<StackDescription> {
    loop {
        tokio::time::sleep(policy.next_delay()).await;

        let description = stacks.describe_stack(stack_id).await?;
        match description.status_class() {
            StatusClass::InProgress => {
                tracing::info!(
                    "Waiting for {} to complete: {}",
                    operation,
                    description.status
                );
            }
            _ => return Ok(description),
        }
    }
}

/// 失敗したリソースのイベントを全ページ出力
async fn log_failed_events(stacks: &dyn StackService, stack_id: &str) {
    let mut next_token: Option<String> = None;
    loop {
        let page = match stacks
            .describe_stack_events(stack_id, next_token.as_deref())
            .await
        {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Failed to describe stack events: {}", e);
                return;
            }
        };

        for event in page.events.iter().filter(|event| event.is_failure()) {
            tracing::error!(
                "Error ensuring {} ({}): {}",
                event.resource_type,
                event.logical_resource_id,
                event.status_reason.as_deref().unwrap_or_default()
            );
        }

        match page.next_token {
            Some(token) => next_token = Some(token),
            None => return,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratus_template::Resource;

    #[test]
    fn test_template_key() {
        let key = template_key("My Service", "{}");
        assert!(key.starts_with("My-Service-"));
        assert!(key.ends_with("-cf.json"));
        // sha256 hex
        assert_eq!(key.len(), "My-Service-".len() + 64 + "-cf.json".len());
        assert_eq!(key, template_key("My Service", "{}"));
        assert_ne!(key, template_key("My Service", "{ }"));
    }

    #[test]
    fn test_capabilities_without_roles() {
        let template = Template::default();
        assert!(capabilities(&template).is_empty());
    }

    #[test]
    fn test_capabilities_single_iam_entry() {
        let mut template = Template::default();
        for id in ["IAMRoleA", "IAMRoleB"] {
            template.add_resource(id, Resource::new(resource_types::IAM_ROLE, json!({})));
        }
        assert_eq!(capabilities(&template), vec![CAPABILITY_IAM.to_string()]);
    }
}
