//! Lenient scalar values for game client payloads.
//!
//! The tracker client sends numbers and booleans either as JSON literals or
//! as strings, and form-encoded bodies only ever carry strings. [`Scalar`]
//! accepts all of these so the request structs can stay typed while
//! validation decides what a value means.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::Number;
use utoipa::openapi::schema::{ObjectBuilder, OneOfBuilder, Schema, Type};
use utoipa::openapi::RefOr;

/// A JSON or form scalar as sent by the client.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    /// A JSON number.
    Number(Number),
    /// A JSON boolean.
    Bool(bool),
    /// Text, including numbers sent as strings.
    Text(String),
}

impl Scalar {
    /// Text content; numbers and booleans are rendered.
    pub fn text(&self) -> String {
        match self {
            Self::Number(number) => number.to_string(),
            Self::Bool(flag) => flag.to_string(),
            Self::Text(text) => text.clone(),
        }
    }

    /// Whether the value is an empty or blank string.
    pub fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }

    /// Numeric value, parsing strings.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.as_f64(),
            Self::Bool(_) => None,
            Self::Text(text) => text.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }

    /// Integer value; fractional input is rounded.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(number) => number
                .as_i64()
                .or_else(|| number.as_f64().map(|value| value.round() as i64)),
            Self::Bool(_) => None,
            Self::Text(text) => {
                let trimmed = text.trim();
                trimmed.parse::<i64>().ok().or_else(|| {
                    trimmed
                        .parse::<f64>()
                        .ok()
                        .filter(|v| v.is_finite())
                        .map(|value| value.round() as i64)
                })
            }
        }
    }

    /// Boolean value: JSON booleans, `0`/`1` and `true`/`false` text.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            Self::Number(number) => number.as_i64().map(|value| value != 0),
            Self::Text(text) => match text.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Some(true),
                "0" | "false" | "no" | "off" | "" => Some(false),
                _ => None,
            },
        }
    }
}

impl utoipa::PartialSchema for Scalar {
    fn schema() -> RefOr<Schema> {
        let variant = |kind: Type| RefOr::T(Schema::Object(ObjectBuilder::new().schema_type(kind).build()));
        let one_of = OneOfBuilder::new()
            .item(variant(Type::Number))
            .item(variant(Type::Boolean))
            .item(variant(Type::String))
            .description(Some("Number, boolean, or the same as a string"))
            .build();
        RefOr::T(Schema::OneOf(one_of))
    }
}

impl utoipa::ToSchema for Scalar {
    fn name() -> Cow<'static, str> {
        Cow::Borrowed("Scalar")
    }
}
