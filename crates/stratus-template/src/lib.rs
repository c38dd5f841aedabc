//! Stratus CloudFormation template model
//!
//! A deliberately small object model for the parts of a CloudFormation
//! template that Stratus synthesizes: resources (type, properties,
//! `DependsOn`, `Metadata`) and outputs. Templates can be merged, and
//! serialize to a canonical JSON form with sorted keys so that identical
//! inputs always hash to the same value.
//!
//! ```
//! use stratus_template::{Expr, Output, Resource, Template, resource_types};
//!
//! let mut template = Template::new("Example");
//! template.add_resource(
//!     "Bucket",
//!     Resource::new(resource_types::S3_BUCKET, serde_json::json!({})),
//! );
//! template.add_output("BucketName", Output::new("Bucket name", Expr::reference("Bucket")));
//! assert!(template.to_canonical_json().is_ok());
//! ```

pub mod error;
pub mod expr;
pub mod outputs;
pub mod template;

pub use error::{Result, TemplateError};
pub use expr::{Expr, pseudo};
pub use outputs::outputs_for_resource;
pub use template::{Output, Resource, Template, resource_types};
