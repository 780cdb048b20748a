//! Dynamically-typed field values.
//!
//! [`Value`] is what a sparse update or a filter carries for each field. The
//! builders never convert values; adapting a value to the target column type
//! happens only when it is bound to a statement.

use crate::error::{JoblyError, JoblyResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A single bindable field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Decimal(Decimal),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Convert a JSON scalar into a `Value`.
    ///
    /// Integral numbers become [`Value::Int`], other numbers [`Value::Float`].
    /// Arrays and objects are rejected.
    pub fn from_json(field: &str, value: serde_json::Value) -> JoblyResult<Self> {
        use serde_json::Value as Json;

        match value {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(b)),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Ok(Value::Int(i)),
                None => n.as_f64().map(Value::Float).ok_or_else(|| {
                    JoblyError::validation(format!("{field}: number out of range"))
                }),
            },
            Json::String(s) => Ok(Value::Text(s)),
            Json::Array(_) | Json::Object(_) => Err(JoblyError::validation(format!(
                "{field}: expected a scalar value"
            ))),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Decimal(_) => "decimal",
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v.into())
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Decimal> for Value {
    fn from(v: Decimal) -> Self {
        Value::Decimal(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

/// Encode `value` only if its own `ToSql` impl accepts the column type.
fn encode<T: ToSql>(value: &T, ty: &Type, out: &mut BytesMut, kind: &str) -> Result<IsNull, BoxError> {
    if !T::accepts(ty) {
        return Err(format!("cannot bind {kind} value to column of type {ty}").into());
    }
    value.to_sql(ty, out)
}

fn encode_int(v: i64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        Type::INT2 => i16::try_from(v)?.to_sql(ty, out),
        Type::INT4 => i32::try_from(v)?.to_sql(ty, out),
        Type::INT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::from(v).to_sql(ty, out),
        Type::FLOAT4 | Type::FLOAT8 => encode_float(v as f64, ty, out),
        _ => Err(format!("cannot bind integer value to column of type {ty}").into()),
    }
}

fn encode_float(v: f64, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
    match *ty {
        // JSON bodies may spell integers as `100.0`.
        Type::INT2 | Type::INT4 | Type::INT8 => {
            if v.fract() != 0.0 || !(i64::MIN as f64..i64::MAX as f64).contains(&v) {
                return Err(format!("cannot bind non-integral {v} to column of type {ty}").into());
            }
            encode_int(v as i64, ty, out)
        }
        Type::FLOAT4 => (v as f32).to_sql(ty, out),
        Type::FLOAT8 => v.to_sql(ty, out),
        Type::NUMERIC => Decimal::try_from(v)?.to_sql(ty, out),
        _ => Err(format!("cannot bind float value to column of type {ty}").into()),
    }
}

impl ToSql for Value {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            Value::Null => Ok(IsNull::Yes),
            Value::Bool(v) => encode(v, ty, out, self.kind()),
            Value::Int(v) => encode_int(*v, ty, out),
            Value::Float(v) => encode_float(*v, ty, out),
            // NUMERIC columns accept decimal text such as "0.25".
            Value::Text(v) if *ty == Type::NUMERIC => v.trim().parse::<Decimal>()?.to_sql(ty, out),
            Value::Text(v) => encode(v, ty, out, self.kind()),
            Value::Decimal(v) => encode(v, ty, out, self.kind()),
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bind(value: &Value, ty: &Type) -> Result<(IsNull, BytesMut), BoxError> {
        let mut out = BytesMut::new();
        let is_null = value.to_sql(ty, &mut out)?;
        Ok((is_null, out))
    }

    #[test]
    fn null_binds_as_sql_null() {
        let (is_null, out) = bind(&Value::Null, &Type::INT4).unwrap();
        assert!(matches!(is_null, IsNull::Yes));
        assert!(out.is_empty());
    }

    #[test]
    fn int_narrows_to_column_width() {
        let (_, out) = bind(&Value::Int(32), &Type::INT4).unwrap();
        assert_eq!(&out[..], &32_i32.to_be_bytes());

        let (_, out) = bind(&Value::Int(32), &Type::INT8).unwrap();
        assert_eq!(&out[..], &32_i64.to_be_bytes());
    }

    #[test]
    fn int_out_of_range_for_column_is_rejected() {
        assert!(bind(&Value::Int(70_000), &Type::INT2).is_err());
        assert!(bind(&Value::Int(i64::MAX), &Type::INT4).is_err());
    }

    #[test]
    fn integral_float_binds_to_integer_column() {
        let (_, out) = bind(&Value::Float(100.0), &Type::INT4).unwrap();
        assert_eq!(&out[..], &100_i32.to_be_bytes());

        assert!(bind(&Value::Float(100.5), &Type::INT4).is_err());
        assert!(bind(&Value::Float(f64::NAN), &Type::INT4).is_err());
        assert!(bind(&Value::Float(3.0e9), &Type::INT4).is_err());
    }

    #[test]
    fn decimal_text_binds_to_numeric() {
        assert!(bind(&Value::from("0.25"), &Type::NUMERIC).is_ok());
        assert!(bind(&Value::from("a quarter"), &Type::NUMERIC).is_err());
    }

    #[test]
    fn text_does_not_bind_to_integer_column() {
        assert!(bind(&Value::from("hunred dollas"), &Type::INT4).is_err());
    }

    #[test]
    fn option_none_is_null() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("Aliya")), Value::Text("Aliya".into()));
    }

    #[test]
    fn from_json_scalars() {
        let v = Value::from_json("age", serde_json::json!(32)).unwrap();
        assert_eq!(v, Value::Int(32));

        let v = Value::from_json("equity", serde_json::json!(0.5)).unwrap();
        assert_eq!(v, Value::Float(0.5));

        let err = Value::from_json("tags", serde_json::json!(["a"])).unwrap_err();
        assert!(err.is_validation());
    }
}
