//! Dynamic bound values.
//!
//! [`Value`] is what a rendering context accumulates as statement parameters.
//! `Value::List` is the sequence type: by default it is flattened into one
//! positional parameter per element, under the `nesting` option it is bound
//! as a single array parameter.

use bytes::BytesMut;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt;
use tokio_postgres::types::{FromSql, IsNull, Kind, ToSql, Type, to_sql_checked};

type BoxError = Box<dyn Error + Sync + Send>;

/// A single bound parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL.
    Null,
    /// Boolean value.
    Bool(bool),
    /// Integer value (binds as int2/int4/int8 depending on the target type).
    Int(i64),
    /// Float value (binds as float4/float8 depending on the target type).
    Float(f64),
    /// Text value.
    Text(String),
    /// Binary value.
    Bytes(Vec<u8>),
    /// UUID value.
    Uuid(uuid::Uuid),
    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),
    /// JSON document.
    Json(serde_json::Value),
    /// Ordered sequence of values.
    List(Vec<Value>),
}

impl Value {
    /// Build a binary value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Build a list from anything convertible to values.
    pub fn list<T: Into<Value>>(items: impl IntoIterator<Item = T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is a sequence.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(v) => write!(f, "{v}"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Text(v) => write!(f, "'{}'", v.replace('\'', "''")),
            Value::Bytes(v) => write!(f, "<{} bytes>", v.len()),
            Value::Uuid(v) => write!(f, "'{v}'"),
            Value::Timestamp(v) => write!(f, "'{v}'"),
            Value::Json(v) => write!(f, "'{v}'"),
            Value::List(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

/// JSON view of a value, used to deserialize records into serde types.
///
/// Timestamps become `YYYY-MM-DDTHH:MM:SS[.f]` strings and bytes become
/// arrays of numbers; non-finite floats become `null`.
impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Value::Null => Json::Null,
            Value::Bool(v) => Json::Bool(v),
            Value::Int(v) => Json::from(v),
            Value::Float(v) => serde_json::Number::from_f64(v).map_or(Json::Null, Json::Number),
            Value::Text(v) => Json::String(v),
            Value::Bytes(v) => Json::from(v),
            Value::Uuid(v) => Json::String(v.to_string()),
            Value::Timestamp(v) => Json::String(v.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
            Value::Json(v) => v,
            Value::List(items) => Json::Array(items.into_iter().map(Json::from).collect()),
        }
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::Int(i64::from(v))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Uuid(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::Timestamp(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v)
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::list(v)
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => v.to_sql_checked(ty, out),
            Value::Int(v) => {
                if *ty == Type::INT2 {
                    i16::try_from(*v)?.to_sql_checked(ty, out)
                } else if *ty == Type::INT4 {
                    i32::try_from(*v)?.to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Float(v) => {
                if *ty == Type::FLOAT4 {
                    #[allow(clippy::cast_possible_truncation)]
                    (*v as f32).to_sql_checked(ty, out)
                } else {
                    v.to_sql_checked(ty, out)
                }
            }
            Value::Text(v) => v.to_sql_checked(ty, out),
            Value::Bytes(v) => v.to_sql_checked(ty, out),
            Value::Uuid(v) => v.to_sql_checked(ty, out),
            Value::Timestamp(v) => v.to_sql_checked(ty, out),
            Value::Json(v) => v.to_sql_checked(ty, out),
            Value::List(items) => items.to_sql_checked(ty, out),
        }
    }

    // The concrete check happens per variant in `to_sql`.
    fn accepts(_ty: &Type) -> bool {
        true
    }

    to_sql_checked!();
}

impl<'a> FromSql<'a> for Value {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, BoxError> {
        if let Kind::Array(_) = ty.kind() {
            return Ok(Value::List(Vec::<Value>::from_sql(ty, raw)?));
        }

        let value = match ty {
            t if *t == Type::BOOL => Value::Bool(bool::from_sql(ty, raw)?),
            t if *t == Type::INT2 => Value::Int(i16::from_sql(ty, raw)?.into()),
            t if *t == Type::INT4 => Value::Int(i32::from_sql(ty, raw)?.into()),
            t if *t == Type::INT8 => Value::Int(i64::from_sql(ty, raw)?),
            t if *t == Type::FLOAT4 => Value::Float(f32::from_sql(ty, raw)?.into()),
            t if *t == Type::FLOAT8 => Value::Float(f64::from_sql(ty, raw)?),
            t if *t == Type::TEXT
                || *t == Type::VARCHAR
                || *t == Type::BPCHAR
                || *t == Type::NAME
                || *t == Type::UNKNOWN =>
            {
                Value::Text(String::from_sql(ty, raw)?)
            }
            t if *t == Type::BYTEA => Value::Bytes(Vec::<u8>::from_sql(ty, raw)?),
            t if *t == Type::UUID => Value::Uuid(uuid::Uuid::from_sql(ty, raw)?),
            t if *t == Type::TIMESTAMP => Value::Timestamp(NaiveDateTime::from_sql(ty, raw)?),
            t if *t == Type::TIMESTAMPTZ => Value::Timestamp(
                chrono::DateTime::<chrono::Utc>::from_sql(ty, raw)?.naive_utc(),
            ),
            t if *t == Type::JSON || *t == Type::JSONB => {
                Value::Json(serde_json::Value::from_sql(ty, raw)?)
            }
            _ => return Err(format!("unsupported column type `{ty}`").into()),
        };
        Ok(value)
    }

    fn from_sql_null(_ty: &Type) -> Result<Self, BoxError> {
        Ok(Value::Null)
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}
