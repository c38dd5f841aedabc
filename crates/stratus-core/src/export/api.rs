//! API Gatewayのエクスポート

use super::{Export, ExportContext, insert_unique};
use crate::error::ExportError;
use crate::model::{ApiSpec, function_logical_id};
use crate::naming::logical_name;
use serde_json::json;
use stratus_template::{Expr, Output, Resource, Template, TemplateError, pseudo, resource_types};

pub const API_GATEWAY_URL_OUTPUT: &str = "APIGatewayURL";

impl ApiSpec {
    fn logical_id(&self) -> String {
        format!("{}RestApi", logical_name(&self.name))
    }

    /// パスに対応する `AWS::ApiGateway::Resource` を（親から順に）用意し、
    /// 末端のリソースIDを返す
    ///
    /// 別のパスと論理IDが衝突した場合はエラーです。
    fn ensure_path(&self, segments: &[&str], template: &mut Template) -> Result<Expr, ExportError> {
        let api_id = self.logical_id();
        let mut parent = Expr::get_att(api_id.as_str(), "RootResourceId");

        for depth in 0..segments.len() {
            let prefix = segments[..=depth].join("/");
            let resource_id = format!("{}Resource{}", api_id, logical_name(&prefix));
            let properties = json!({
                "RestApiId": Expr::reference(api_id.as_str()),
                "ParentId": parent,
                "PathPart": segments[depth],
            });
            match template.resource(&resource_id) {
                Some(existing) if existing.properties != properties => {
                    return Err(TemplateError::DuplicateResource(resource_id).into());
                }
                Some(_) => {}
                None => {
                    template.add_resource(
                        resource_id.clone(),
                        Resource::new(resource_types::API_GATEWAY_RESOURCE, properties),
                    );
                }
            }
            parent = Expr::reference(resource_id);
        }

        Ok(parent)
    }
}

fn invocation_uri(function_id: &str) -> Expr {
    Expr::join(
        "",
        vec![
            Expr::string("arn:aws:apigateway:"),
            Expr::reference(pseudo::REGION),
            Expr::string(":lambda:path/2015-03-31/functions/"),
            Expr::get_att(function_id, "Arn"),
            Expr::string("/invocations"),
        ],
    )
}

impl Export for ApiSpec {
    fn export(&self, _ctx: &ExportContext<'_>, template: &mut Template) -> Result<(), ExportError> {
        if self.resources.is_empty() {
            return Err(ExportError::InvalidConfig(format!(
                "api '{}' declares no resources",
                self.name
            )));
        }

        let api_id = self.logical_id();
        insert_unique(
            template,
            api_id.clone(),
            Resource::new(
                resource_types::API_GATEWAY_REST_API,
                json!({
                    "Name": self.name,
                    "Description": self.description,
                }),
            ),
        )?;

        let mut method_ids = Vec::new();
        for api_resource in &self.resources {
            let segments = api_resource.segments();
            let resource_ref = self.ensure_path(&segments, template)?;
            let function_id = function_logical_id(&api_resource.function);

            for method in api_resource.effective_methods() {
                let method_id = format!(
                    "{}{}{}Method",
                    api_id,
                    logical_name(&api_resource.path),
                    logical_name(&method.to_ascii_lowercase())
                );
                let resource = Resource::new(
                    resource_types::API_GATEWAY_METHOD,
                    json!({
                        "RestApiId": Expr::reference(api_id.as_str()),
                        "ResourceId": resource_ref,
                        "HttpMethod": method,
                        "AuthorizationType": "NONE",
                        "Integration": {
                            "Type": "AWS_PROXY",
                            "IntegrationHttpMethod": "POST",
                            "Uri": invocation_uri(&function_id),
                        },
                    }),
                )
                .with_depends_on(function_id.as_str());
                insert_unique(template, method_id.clone(), resource)?;
                method_ids.push(method_id);
            }

            // 同じ関数への権限は1つで十分
            let permission_id = format!("{}{}Permission", api_id, function_id);
            if !template.contains_resource(&permission_id) {
                let permission = Resource::new(
                    resource_types::LAMBDA_PERMISSION,
                    json!({
                        "Action": "lambda:InvokeFunction",
                        "FunctionName": Expr::get_att(function_id.as_str(), "Arn"),
                        "Principal": "apigateway.amazonaws.com",
                        "SourceArn": Expr::join("", vec![
                            Expr::string("arn:aws:execute-api:"),
                            Expr::reference(pseudo::REGION),
                            Expr::string(":"),
                            Expr::reference(pseudo::ACCOUNT_ID),
                            Expr::string(":"),
                            Expr::reference(api_id.as_str()),
                            Expr::string("/*"),
                        ]),
                    }),
                );
                template.add_resource(permission_id, permission);
            }
        }

        let mut deployment = Resource::new(
            resource_types::API_GATEWAY_DEPLOYMENT,
            json!({
                "RestApiId": Expr::reference(api_id.as_str()),
                "StageName": self.stage,
            }),
        );
        for method_id in method_ids {
            deployment.add_depends_on(method_id);
        }
        insert_unique(template, format!("{}Deployment", api_id), deployment)?;

        template.add_output(
            API_GATEWAY_URL_OUTPUT,
            Output::new(
                "API Gateway URL",
                Expr::join(
                    "",
                    vec![
                        Expr::string("https://"),
                        Expr::reference(api_id.as_str()),
                        Expr::string(".execute-api."),
                        Expr::reference(pseudo::REGION),
                        Expr::string(format!(".amazonaws.com/{}", self.stage)),
                    ],
                ),
            ),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::RoleMap;
    use crate::model::ApiResource;

    fn export(api: &ApiSpec) -> Template {
        let roles = RoleMap::new();
        let ctx = ExportContext::new("demo", "artifacts", "demo.zip", &roles);
        let mut template = Template::new("test");
        api.export(&ctx, &mut template).unwrap();
        template
    }

    #[test]
    fn test_export_api() {
        let mut api = ApiSpec::new("demo-api");
        api.resources
            .push(ApiResource::new("/hello", "hello").with_methods(["GET", "POST"]));
        api.resources.push(ApiResource::new("/hello/world", "hello"));

        let template = export(&api);

        assert!(template.contains_resource("DemoApiRestApi"));
        assert!(template.contains_resource("DemoApiRestApiResourceHello"));
        assert!(template.contains_resource("DemoApiRestApiResourceHelloWorld"));
        assert_eq!(
            template.logical_ids_of_type("AWS::ApiGateway::Method").len(),
            3
        );
        // 1関数につき権限は1つ
        assert_eq!(
            template.logical_ids_of_type("AWS::Lambda::Permission").len(),
            1
        );

        let nested = template.resource("DemoApiRestApiResourceHelloWorld").unwrap();
        assert_eq!(nested.properties["PathPart"], "world");
        assert_eq!(
            nested.properties["ParentId"]["Ref"],
            "DemoApiRestApiResourceHello"
        );

        let method = template.resource("DemoApiRestApiHelloPostMethod").unwrap();
        assert_eq!(method.properties["Integration"]["Type"], "AWS_PROXY");
        assert_eq!(method.depends_on, vec!["HelloLambda"]);

        let deployment = template.resource("DemoApiRestApiDeployment").unwrap();
        assert_eq!(deployment.properties["StageName"], "prod");
        assert_eq!(deployment.depends_on.len(), 3);

        assert!(template.outputs.contains_key(API_GATEWAY_URL_OUTPUT));
    }

    #[test]
    fn test_export_api_root_path() {
        let mut api = ApiSpec::new("root");
        api.resources.push(ApiResource::new("/", "index"));

        let template = export(&api);
        let method = template.resource("RootRestApiGetMethod").unwrap();
        assert_eq!(
            method.properties["ResourceId"]["Fn::GetAtt"][1],
            "RootResourceId"
        );
        assert!(
            template
                .logical_ids_of_type("AWS::ApiGateway::Resource")
                .is_empty()
        );
    }

    #[test]
    fn test_export_api_without_resources() {
        let roles = RoleMap::new();
        let ctx = ExportContext::new("demo", "artifacts", "demo.zip", &roles);
        let mut template = Template::new("test");
        assert!(ApiSpec::new("empty").export(&ctx, &mut template).is_err());
    }

    #[test]
    fn test_export_api_colliding_paths() {
        let mut api = ApiSpec::new("demo-api");
        api.resources.push(ApiResource::new("/hello-world", "hello"));
        api.resources
            .push(ApiResource::new("/hello/world", "hello").with_methods(["POST"]));

        let roles = RoleMap::new();
        let ctx = ExportContext::new("demo", "artifacts", "demo.zip", &roles);
        let mut template = Template::new("test");
        let result = api.export(&ctx, &mut template);
        assert!(matches!(
            result,
            Err(ExportError::Template(TemplateError::DuplicateResource(_)))
        ));
    }
}
