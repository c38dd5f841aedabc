//! S3静的サイトのエクスポート

use super::{API_GATEWAY_URL_OUTPUT, Export, ExportContext, NODE_RUNTIME, insert_unique};
use crate::error::ExportError;
use crate::model::{SiteSpec, assume_role_policy};
use serde_json::json;
use stratus_template::{Expr, Output, Resource, Template, resource_types};

pub const S3_SITE_URL_OUTPUT: &str = "S3SiteURL";

/// アダプタ（index.js）がエクスポートするサイト展開用ハンドラー
pub const SITE_HANDLER: &str = "index.s3Site";

const BUCKET_ID: &str = "S3SiteBucket";
const BUCKET_POLICY_ID: &str = "S3SiteBucketPolicy";
const ROLE_ID: &str = "S3SiteRole";
const FUNCTION_ID: &str = "S3SiteCustomResourceLambda";
const CUSTOM_RESOURCE_ID: &str = "S3SiteCustomResource";
const CUSTOM_RESOURCE_TYPE: &str = "Custom::StratusS3Site";

fn bucket_objects_arn() -> Expr {
    Expr::join(
        "",
        vec![
            Expr::string("arn:aws:s3:::"),
            Expr::reference(BUCKET_ID),
            Expr::string("/*"),
        ],
    )
}

impl Export for SiteSpec {
    fn export(&self, ctx: &ExportContext<'_>, template: &mut Template) -> Result<(), ExportError> {
        let archive_key = ctx
            .site_archive_key
            .ok_or(ExportError::MissingSiteArchive)?;

        let mut bucket_properties = json!({
            "WebsiteConfiguration": {
                "IndexDocument": self.index_document,
                "ErrorDocument": self.error_document,
            },
        });
        if let Some(bucket_name) = &self.bucket_name {
            bucket_properties["BucketName"] = json!(bucket_name);
        }
        insert_unique(
            template,
            BUCKET_ID.to_string(),
            Resource::new(resource_types::S3_BUCKET, bucket_properties),
        )?;

        insert_unique(
            template,
            BUCKET_POLICY_ID.to_string(),
            Resource::new(
                resource_types::S3_BUCKET_POLICY,
                json!({
                    "Bucket": Expr::reference(BUCKET_ID),
                    "PolicyDocument": {
                        "Version": "2012-10-17",
                        "Statement": [{
                            "Sid": "PublicReadGetObject",
                            "Effect": "Allow",
                            "Principal": "*",
                            "Action": "s3:GetObject",
                            "Resource": bucket_objects_arn(),
                        }],
                    },
                }),
            ),
        )?;

        // サイト展開用Lambdaのロール
        insert_unique(
            template,
            ROLE_ID.to_string(),
            Resource::new(
                resource_types::IAM_ROLE,
                json!({
                    "AssumeRolePolicyDocument": assume_role_policy(),
                    "Policies": [{
                        "PolicyName": "S3SitePolicy",
                        "PolicyDocument": {
                            "Version": "2012-10-17",
                            "Statement": [
                                {
                                    "Effect": "Allow",
                                    "Action": ["logs:CreateLogGroup", "logs:CreateLogStream", "logs:PutLogEvents"],
                                    "Resource": "arn:aws:logs:*:*:*",
                                },
                                {
                                    "Effect": "Allow",
                                    "Action": ["s3:PutObject", "s3:DeleteObject"],
                                    "Resource": bucket_objects_arn(),
                                },
                                {
                                    "Effect": "Allow",
                                    "Action": ["s3:ListBucket"],
                                    "Resource": Expr::join("", vec![
                                        Expr::string("arn:aws:s3:::"),
                                        Expr::reference(BUCKET_ID),
                                    ]),
                                },
                                {
                                    "Effect": "Allow",
                                    "Action": ["s3:GetObject"],
                                    "Resource": format!("arn:aws:s3:::{}/{}", ctx.bucket, archive_key),
                                },
                            ],
                        },
                    }],
                }),
            ),
        )?;

        insert_unique(
            template,
            FUNCTION_ID.to_string(),
            Resource::new(
                resource_types::LAMBDA_FUNCTION,
                json!({
                    "Code": {
                        "S3Bucket": ctx.bucket,
                        "S3Key": ctx.code_key,
                    },
                    "Description": format!("{}: S3 site deployment", ctx.service_name),
                    "Handler": SITE_HANDLER,
                    "MemorySize": 256,
                    "Role": Expr::get_att(ROLE_ID, "Arn"),
                    "Runtime": NODE_RUNTIME,
                    "Timeout": 300,
                }),
            )
            .with_depends_on(ROLE_ID),
        )?;

        let mut custom_properties = json!({
            "ServiceToken": Expr::get_att(FUNCTION_ID, "Arn"),
            "TargetBucket": Expr::reference(BUCKET_ID),
            "SourceBucket": ctx.bucket,
            "SourceKey": archive_key,
        });
        if let Some(api_url) = ctx
            .api_outputs
            .and_then(|outputs| outputs.get(API_GATEWAY_URL_OUTPUT))
        {
            custom_properties["APIGatewayURL"] = json!(api_url.value);
        }
        let mut custom = Resource::new(CUSTOM_RESOURCE_TYPE, custom_properties);
        custom.add_depends_on(BUCKET_ID);
        custom.add_depends_on(FUNCTION_ID);
        insert_unique(template, CUSTOM_RESOURCE_ID.to_string(), custom)?;

        template.add_output(
            S3_SITE_URL_OUTPUT,
            Output::new("S3 website URL", Expr::get_att(BUCKET_ID, "WebsiteURL")),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::RoleMap;
    use std::collections::BTreeMap;

    #[test]
    fn test_export_site() {
        let roles = RoleMap::new();
        let mut api_outputs = BTreeMap::new();
        api_outputs.insert(
            API_GATEWAY_URL_OUTPUT.to_string(),
            Output::new("url", Expr::string("https://example.com/prod")),
        );
        let ctx = ExportContext::new("demo", "artifacts", "demo.zip", &roles)
            .with_site_archive("demo-S3Site.zip")
            .with_api_outputs(&api_outputs);

        let mut site = SiteSpec::new("public");
        site.bucket_name = Some("demo-site".to_string());
        let mut template = Template::new("test");
        site.export(&ctx, &mut template).unwrap();

        let bucket = template.resource(BUCKET_ID).unwrap();
        assert_eq!(bucket.properties["BucketName"], "demo-site");
        assert_eq!(
            bucket.properties["WebsiteConfiguration"]["IndexDocument"],
            "index.html"
        );

        let custom = template.resource(CUSTOM_RESOURCE_ID).unwrap();
        assert!(custom.is_custom_resource());
        assert_eq!(custom.properties["SourceKey"], "demo-S3Site.zip");
        assert_eq!(
            custom.properties["APIGatewayURL"],
            "https://example.com/prod"
        );

        let function = template.resource(FUNCTION_ID).unwrap();
        assert_eq!(function.properties["Handler"], "index.s3Site");
        assert!(template.has_resource_type("AWS::IAM::Role"));
        assert!(template.outputs.contains_key(S3_SITE_URL_OUTPUT));
    }

    #[test]
    fn test_export_site_without_archive() {
        let roles = RoleMap::new();
        let ctx = ExportContext::new("demo", "artifacts", "demo.zip", &roles);
        let mut template = Template::new("test");
        assert!(matches!(
            SiteSpec::new("public").export(&ctx, &mut template),
            Err(ExportError::MissingSiteArchive)
        ));
    }
}
