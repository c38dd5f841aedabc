//! Template, resource and output types

use crate::error::{Result, TemplateError};
use crate::expr::Expr;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

const FORMAT_VERSION: &str = "2010-09-09";

/// Resource type names used by Stratus
pub mod resource_types {
    pub const IAM_ROLE: &str = "AWS::IAM::Role";
    pub const LAMBDA_FUNCTION: &str = "AWS::Lambda::Function";
    pub const LAMBDA_PERMISSION: &str = "AWS::Lambda::Permission";
    pub const LAMBDA_EVENT_SOURCE_MAPPING: &str = "AWS::Lambda::EventSourceMapping";
    pub const API_GATEWAY_REST_API: &str = "AWS::ApiGateway::RestApi";
    pub const API_GATEWAY_RESOURCE: &str = "AWS::ApiGateway::Resource";
    pub const API_GATEWAY_METHOD: &str = "AWS::ApiGateway::Method";
    pub const API_GATEWAY_DEPLOYMENT: &str = "AWS::ApiGateway::Deployment";
    pub const S3_BUCKET: &str = "AWS::S3::Bucket";
    pub const S3_BUCKET_POLICY: &str = "AWS::S3::BucketPolicy";
    pub const SNS_TOPIC: &str = "AWS::SNS::Topic";
    pub const SQS_QUEUE: &str = "AWS::SQS::Queue";
    pub const DYNAMODB_TABLE: &str = "AWS::DynamoDB::Table";
    pub const KINESIS_STREAM: &str = "AWS::Kinesis::Stream";
    pub const CUSTOM_RESOURCE_PREFIX: &str = "Custom::";
}

/// A CloudFormation template
///
/// Resources and outputs live in ordered maps, so serialization is
/// independent of insertion order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Template {
    #[serde(rename = "AWSTemplateFormatVersion")]
    pub format_version: String,

    #[serde(rename = "Description", skip_serializing_if = "String::is_empty")]
    pub description: String,

    #[serde(rename = "Resources")]
    pub resources: BTreeMap<String, Resource>,

    #[serde(rename = "Outputs", skip_serializing_if = "BTreeMap::is_empty")]
    pub outputs: BTreeMap<String, Output>,
}

impl Default for Template {
    fn default() -> Self {
        Self {
            format_version: FORMAT_VERSION.to_string(),
            description: String::new(),
            resources: BTreeMap::new(),
            outputs: BTreeMap::new(),
        }
    }
}

impl Template {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    /// Add (or replace) a resource, returning the previous definition
    pub fn add_resource(&mut self, logical_id: impl Into<String>, resource: Resource) -> Option<Resource> {
        self.resources.insert(logical_id.into(), resource)
    }

    pub fn resource(&self, logical_id: &str) -> Option<&Resource> {
        self.resources.get(logical_id)
    }

    pub fn resource_mut(&mut self, logical_id: &str) -> Option<&mut Resource> {
        self.resources.get_mut(logical_id)
    }

    pub fn contains_resource(&self, logical_id: &str) -> bool {
        self.resources.contains_key(logical_id)
    }

    /// Iterate over `(logical id, resource)` pairs of the given type
    pub fn resources_of_type<'a>(
        &'a self,
        resource_type: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a Resource)> + 'a {
        self.resources
            .iter()
            .filter(move |(_, r)| r.resource_type == resource_type)
    }

    /// Logical ids of every resource of the given type
    pub fn logical_ids_of_type(&self, resource_type: &str) -> Vec<String> {
        self.resources_of_type(resource_type)
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn has_resource_type(&self, resource_type: &str) -> bool {
        self.resources_of_type(resource_type).next().is_some()
    }

    /// Add (or overwrite) an output
    pub fn add_output(&mut self, name: impl Into<String>, output: Output) -> Option<Output> {
        self.outputs.insert(name.into(), output)
    }

    /// Merge `other` into this template
    ///
    /// Fails without modifying `self` if any resource logical id or output
    /// name already exists here.
    pub fn merge(&mut self, other: Template) -> Result<()> {
        if let Some(id) = other.resources.keys().find(|id| self.resources.contains_key(*id)) {
            return Err(TemplateError::DuplicateResource(id.clone()));
        }
        if let Some(name) = other.outputs.keys().find(|name| self.outputs.contains_key(*name)) {
            return Err(TemplateError::DuplicateOutput(name.clone()));
        }

        tracing::debug!(
            "Merging template: {} resources, {} outputs",
            other.resources.len(),
            other.outputs.len()
        );
        self.resources.extend(other.resources);
        self.outputs.extend(other.outputs);
        Ok(())
    }

    /// Compact JSON with sorted keys, suitable for content hashing
    pub fn to_canonical_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A single template resource
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(rename = "Type")]
    pub resource_type: String,

    #[serde(rename = "Properties", skip_serializing_if = "Value::is_null")]
    pub properties: Value,

    #[serde(rename = "DependsOn", skip_serializing_if = "Vec::is_empty")]
    pub depends_on: Vec<String>,

    #[serde(rename = "Metadata", skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

impl Resource {
    pub fn new(resource_type: impl Into<String>, properties: Value) -> Self {
        Self {
            resource_type: resource_type.into(),
            properties,
            depends_on: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_depends_on(mut self, logical_id: impl Into<String>) -> Self {
        self.add_depends_on(logical_id);
        self
    }

    pub fn add_depends_on(&mut self, logical_id: impl Into<String>) {
        let logical_id = logical_id.into();
        if !self.depends_on.contains(&logical_id) {
            self.depends_on.push(logical_id);
        }
    }

    /// Insert a metadata entry unless the key is already present
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) -> bool {
        let key = key.into();
        if self.metadata.contains_key(&key) {
            return false;
        }
        self.metadata.insert(key, value.into());
        true
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn is_custom_resource(&self) -> bool {
        self.resource_type
            .starts_with(resource_types::CUSTOM_RESOURCE_PREFIX)
    }
}

/// A template output
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Output {
    #[serde(rename = "Description")]
    pub description: String,

    #[serde(rename = "Value")]
    pub value: Expr,
}

impl Output {
    pub fn new(description: impl Into<String>, value: Expr) -> Self {
        Self {
            description: description.into(),
            value,
        }
    }
}
