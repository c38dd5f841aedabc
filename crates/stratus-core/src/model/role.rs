//! IAMロール定義

use super::EventSourceMapping;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use stratus_template::{Resource, resource_types};

const POLICY_VERSION: &str = "2012-10-17";

/// Lambda関数に常に付与するCloudWatch Logs権限
const LOGS_ACTIONS: &[&str] = &[
    "logs:CreateLogGroup",
    "logs:CreateLogStream",
    "logs:PutLogEvents",
];

/// 新規作成するIAMロールの定義
///
/// KDL形式：
/// ```kdl
/// role-definition {
///     privilege "s3:GetObject" "s3:PutObject" resource="arn:aws:s3:::bucket/*"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    #[serde(default)]
    pub privileges: Vec<Privilege>,
}

/// IAMポリシーの1ステートメント
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Privilege {
    pub actions: Vec<String>,
    pub resource: String,
}

impl Privilege {
    pub fn new<I, S>(actions: I, resource: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions.into_iter().map(Into::into).collect(),
            resource: resource.into(),
        }
    }

    fn statement(&self) -> Value {
        json!({
            "Effect": "Allow",
            "Action": self.actions,
            "Resource": self.resource,
        })
    }
}

impl RoleDefinition {
    pub fn with_privilege(mut self, privilege: Privilege) -> Self {
        self.privileges.push(privilege);
        self
    }

    /// 定義内容のハッシュから導出した論理ID
    ///
    /// 同一内容の定義は同じ論理IDになり、テンプレート上で1つのロールを共有します。
    pub fn logical_id(&self) -> String {
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        format!("IAMRole{:x}", Sha256::digest(&canonical))
    }

    /// `AWS::IAM::Role` リソースを生成
    ///
    /// イベントソースマッピングがあれば、そのストリーム/キューの読み取り権限も付与します。
    pub fn to_resource(&self, event_sources: &[EventSourceMapping]) -> Resource {
        let mut statements = vec![json!({
            "Effect": "Allow",
            "Action": LOGS_ACTIONS,
            "Resource": "arn:aws:logs:*:*:*",
        })];
        statements.extend(self.privileges.iter().map(Privilege::statement));
        statements.extend(event_sources.iter().filter_map(event_source_statement));

        Resource::new(
            resource_types::IAM_ROLE,
            json!({
                "AssumeRolePolicyDocument": assume_role_policy(),
                "Policies": [{
                    "PolicyName": "LambdaPolicy",
                    "PolicyDocument": {
                        "Version": POLICY_VERSION,
                        "Statement": statements,
                    },
                }],
            }),
        )
    }
}

/// Lambdaサービスに対する AssumeRole 信頼ポリシー
pub fn assume_role_policy() -> Value {
    json!({
        "Version": POLICY_VERSION,
        "Statement": [{
            "Effect": "Allow",
            "Principal": { "Service": ["lambda.amazonaws.com"] },
            "Action": ["sts:AssumeRole"],
        }],
    })
}

fn event_source_statement(mapping: &EventSourceMapping) -> Option<Value> {
    let actions: &[&str] = match mapping.service()? {
        "kinesis" => &[
            "kinesis:GetRecords",
            "kinesis:GetShardIterator",
            "kinesis:DescribeStream",
            "kinesis:ListStreams",
        ],
        "dynamodb" => &[
            "dynamodb:GetRecords",
            "dynamodb:GetShardIterator",
            "dynamodb:DescribeStream",
            "dynamodb:ListStreams",
        ],
        "sqs" => &[
            "sqs:ReceiveMessage",
            "sqs:DeleteMessage",
            "sqs:GetQueueAttributes",
        ],
        _ => return None,
    };
    Some(json!({
        "Effect": "Allow",
        "Action": actions,
        "Resource": mapping.event_source_arn,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s3_reader() -> RoleDefinition {
        RoleDefinition::default()
            .with_privilege(Privilege::new(["s3:GetObject"], "arn:aws:s3:::bucket/*"))
    }

    #[test]
    fn test_logical_id_is_content_addressed() {
        assert_eq!(s3_reader().logical_id(), s3_reader().logical_id());
        assert_ne!(s3_reader().logical_id(), RoleDefinition::default().logical_id());
        assert!(s3_reader().logical_id().starts_with("IAMRole"));
        assert!(
            s3_reader()
                .logical_id()
                .chars()
                .all(|c| c.is_ascii_alphanumeric())
        );
    }

    #[test]
    fn test_to_resource() {
        let resource = s3_reader().to_resource(&[]);
        assert_eq!(resource.resource_type, "AWS::IAM::Role");

        let statements = &resource.properties["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(statements.as_array().unwrap().len(), 2);
        assert_eq!(statements[0]["Resource"], "arn:aws:logs:*:*:*");
        assert_eq!(statements[1]["Action"][0], "s3:GetObject");
        assert_eq!(
            resource.properties["AssumeRolePolicyDocument"]["Statement"][0]["Principal"]["Service"]
                [0],
            "lambda.amazonaws.com"
        );
    }

    #[test]
    fn test_to_resource_with_event_sources() {
        let sources = vec![
            EventSourceMapping::new("arn:aws:kinesis:us-east-1:123456789012:stream/events"),
            EventSourceMapping::new("arn:aws:unknown:us-east-1:123456789012:thing"),
        ];
        let resource = RoleDefinition::default().to_resource(&sources);
        let statements = &resource.properties["Policies"][0]["PolicyDocument"]["Statement"];
        assert_eq!(statements.as_array().unwrap().len(), 2);
        assert_eq!(statements[1]["Action"][0], "kinesis:GetRecords");
    }
}
