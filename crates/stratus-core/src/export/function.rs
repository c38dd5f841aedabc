//! Lambda関数のエクスポート

use super::{Export, ExportContext, NODE_RUNTIME, insert_unique};
use crate::error::ExportError;
use crate::model::FunctionSpec;
use serde_json::json;
use stratus_template::{Expr, Resource, Template, resource_types};

const DEFAULT_STARTING_POSITION: &str = "TRIM_HORIZON";

impl FunctionSpec {
    fn resolve_role<'a>(&self, ctx: &'a ExportContext<'_>) -> Result<&'a Expr, ExportError> {
        self.role_key()
            .and_then(|key| ctx.roles.get(&key))
            .ok_or_else(|| ExportError::UnresolvedRole(self.name.clone()))
    }
}

impl Export for FunctionSpec {
    fn export(&self, ctx: &ExportContext<'_>, template: &mut Template) -> Result<(), ExportError> {
        let logical_id = self.logical_id();
        let role = self.resolve_role(ctx)?;

        let description = if self.description.is_empty() {
            format!("{}: {}", ctx.service_name, self.name)
        } else {
            self.description.clone()
        };

        let mut properties = json!({
            "Code": {
                "S3Bucket": ctx.bucket,
                "S3Key": ctx.code_key,
            },
            "Description": description,
            "Handler": format!("index.{}", self.handler_name()),
            "MemorySize": self.memory_size,
            "Role": role,
            "Runtime": NODE_RUNTIME,
            "Timeout": self.timeout,
        });
        if !self.environment.is_empty() {
            properties["Environment"] = json!({ "Variables": self.environment });
        }

        let mut resource = Resource::new(resource_types::LAMBDA_FUNCTION, properties);
        if let Some(definition) = &self.role_definition {
            resource.add_depends_on(definition.logical_id());
        }
        for dependency in &self.depends_on {
            resource.add_depends_on(dependency.as_str());
        }
        insert_unique(template, logical_id.clone(), resource)?;

        for (index, source) in self.event_sources.iter().enumerate() {
            let mut properties = json!({
                "EventSourceArn": source.event_source_arn,
                "FunctionName": Expr::reference(logical_id.as_str()),
            });
            // SQSはStartingPositionを受け付けない
            if source.service() != Some("sqs") {
                properties["StartingPosition"] = json!(
                    source
                        .starting_position
                        .as_deref()
                        .unwrap_or(DEFAULT_STARTING_POSITION)
                );
            }
            if let Some(batch_size) = source.batch_size {
                properties["BatchSize"] = json!(batch_size);
            }

            let mapping = Resource::new(resource_types::LAMBDA_EVENT_SOURCE_MAPPING, properties)
                .with_depends_on(logical_id.as_str());
            insert_unique(template, format!("{}EventSource{}", logical_id, index), mapping)?;
        }

        tracing::debug!("Exported function {} as {}", self.name, logical_id);
        Ok(())
    }
}
