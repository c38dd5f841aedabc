//! Template value expressions (literals and intrinsic functions)

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// CloudFormation pseudo parameters
pub mod pseudo {
    pub const REGION: &str = "AWS::Region";
    pub const STACK_ID: &str = "AWS::StackId";
    pub const STACK_NAME: &str = "AWS::StackName";
    pub const ACCOUNT_ID: &str = "AWS::AccountId";
    pub const PARTITION: &str = "AWS::Partition";
}

/// A string-valued template expression
///
/// Either a literal, or one of the intrinsic functions Stratus emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// Literal string
    String(String),
    /// `{"Ref": "<logical id or pseudo parameter>"}`
    Ref(String),
    /// `{"Fn::GetAtt": ["<logical id>", "<attribute>"]}`
    GetAtt(String, String),
    /// `{"Fn::Join": ["<separator>", [...]]}`
    Join(String, Vec<Expr>),
    /// `{"Fn::Sub": "<format>"}`
    Sub(String),
}

impl Expr {
    pub fn string(value: impl Into<String>) -> Self {
        Expr::String(value.into())
    }

    pub fn reference(logical_id: impl Into<String>) -> Self {
        Expr::Ref(logical_id.into())
    }

    pub fn get_att(logical_id: impl Into<String>, attribute: impl Into<String>) -> Self {
        Expr::GetAtt(logical_id.into(), attribute.into())
    }

    pub fn join(separator: impl Into<String>, parts: Vec<Expr>) -> Self {
        Expr::Join(separator.into(), parts)
    }

    pub fn sub(format: impl Into<String>) -> Self {
        Expr::Sub(format.into())
    }

    /// Returns the literal value if this expression is a plain string
    pub fn as_literal(&self) -> Option<&str> {
        match self {
            Expr::String(s) => Some(s),
            _ => None,
        }
    }

    /// Converts the expression into its JSON representation
    pub fn to_value(&self) -> Value {
        match self {
            Expr::String(s) => Value::String(s.clone()),
            Expr::Ref(id) => serde_json::json!({ "Ref": id }),
            Expr::GetAtt(id, attr) => serde_json::json!({ "Fn::GetAtt": [id, attr] }),
            Expr::Join(sep, parts) => {
                let parts: Vec<Value> = parts.iter().map(Expr::to_value).collect();
                serde_json::json!({ "Fn::Join": [sep, parts] })
            }
            Expr::Sub(format) => serde_json::json!({ "Fn::Sub": format }),
        }
    }
}

impl From<Expr> for Value {
    fn from(expr: Expr) -> Self {
        expr.to_value()
    }
}

impl From<&Expr> for Value {
    fn from(expr: &Expr) -> Self {
        expr.to_value()
    }
}

impl Serialize for Expr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Expr::String(s) => serializer.serialize_str(s),
            Expr::Ref(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Ref", id)?;
                map.end()
            }
            Expr::GetAtt(id, attr) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::GetAtt", &[id, attr])?;
                map.end()
            }
            Expr::Join(sep, parts) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Join", &(sep, parts))?;
                map.end()
            }
            Expr::Sub(format) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("Fn::Sub", format)?;
                map.end()
            }
        }
    }
}
