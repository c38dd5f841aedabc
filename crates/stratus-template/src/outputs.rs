//! Standard outputs for well-known resource types
//!
//! Functions that depend on another resource get that resource's outputs
//! merged into their deployment metadata, so the running code can discover
//! bucket names, queue URLs and so on without hardcoding them.

use crate::expr::Expr;
use crate::template::{Template, resource_types};
use std::collections::BTreeMap;

/// Outputs exposed by the resource `logical_id`, if its type is known
///
/// Returns `None` for unknown logical ids and for resource types that have
/// no standard outputs.
pub fn outputs_for_resource(template: &Template, logical_id: &str) -> Option<BTreeMap<String, Expr>> {
    let resource = template.resource(logical_id)?;

    let reference = || Expr::reference(logical_id);
    let attribute = |name: &str| Expr::get_att(logical_id, name);

    let outputs: Vec<(&str, Expr)> = match resource.resource_type.as_str() {
        resource_types::S3_BUCKET => vec![
            ("Ref", reference()),
            ("Arn", attribute("Arn")),
            ("DomainName", attribute("DomainName")),
            ("WebsiteURL", attribute("WebsiteURL")),
        ],
        resource_types::SNS_TOPIC => vec![("Ref", reference()), ("TopicName", attribute("TopicName"))],
        resource_types::SQS_QUEUE => vec![
            ("Ref", reference()),
            ("Arn", attribute("Arn")),
            ("QueueName", attribute("QueueName")),
        ],
        resource_types::DYNAMODB_TABLE => vec![
            ("Ref", reference()),
            ("Arn", attribute("Arn")),
            ("StreamArn", attribute("StreamArn")),
        ],
        resource_types::KINESIS_STREAM => vec![("Ref", reference()), ("Arn", attribute("Arn"))],
        resource_types::LAMBDA_FUNCTION => vec![("Ref", reference()), ("Arn", attribute("Arn"))],
        other => {
            tracing::debug!("No standard outputs for resource type {} ({})", other, logical_id);
            return None;
        }
    };

    Some(
        outputs
            .into_iter()
            .map(|(name, expr)| (name.to_string(), expr))
            .collect(),
    )
}
