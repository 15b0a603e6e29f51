//! Typed SQL values.

#![allow(clippy::match_same_arms)]

use std::cmp::Ordering;
use std::fmt::{self, Display};

use bytes::Bytes;
use garnet_crypto::{MASKED_PASSWORD, PasswordHash};
use serde::{Deserialize, Serialize, Serializer};

use crate::error::{QueryError, Result};
use crate::schema::DataType;

/// A typed SQL value.
///
/// Represents values that can appear as function arguments, row data and
/// comparison operands.
///
/// Credential values are opaque: they render as a fixed mask in every
/// textual channel and are not orderable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL.
    #[default]
    Null,

    // ===== Integer Types =====
    /// 8-bit signed integer (-128 to 127).
    TinyInt(i8),
    /// 16-bit signed integer (-32,768 to 32,767).
    SmallInt(i16),
    /// 32-bit signed integer (-2^31 to 2^31-1).
    Integer(i32),
    /// 64-bit signed integer (-2^63 to 2^63-1).
    BigInt(i64),

    // ===== Numeric Types =====
    /// 64-bit floating point (IEEE 754 double precision).
    Real(f64),

    // ===== String Types =====
    /// UTF-8 text string.
    Text(String),

    // ===== Binary Types =====
    /// Raw bytes (base64 encoded in JSON).
    #[serde(with = "bytes_base64")]
    Bytes(Bytes),

    // ===== Boolean Type =====
    /// Boolean value.
    Boolean(bool),

    // ===== Credential Type =====
    /// Salted password hash. Serializes as the mask, never as the blob.
    #[serde(serialize_with = "serialize_masked", skip_deserializing)]
    Password(PasswordHash),
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::TinyInt(a), Value::TinyInt(b)) => a == b,
            (Value::SmallInt(a), Value::SmallInt(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::BigInt(a), Value::BigInt(b)) => a == b,
            (Value::Real(a), Value::Real(b)) => {
                // Use total ordering for floats: NaN == NaN
                a.to_bits() == b.to_bits()
            }
            (Value::Text(a), Value::Text(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            // Constant-time over the derived hash.
            (Value::Password(a), Value::Password(b)) => a == b,
            _ => false, // Different types are not equal
        }
    }
}

impl Eq for Value {}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);

        match self {
            Value::Null => {}
            Value::TinyInt(v) => v.hash(state),
            Value::SmallInt(v) => v.hash(state),
            Value::Integer(v) => v.hash(state),
            Value::BigInt(v) => v.hash(state),
            Value::Real(v) => v.to_bits().hash(state),
            Value::Text(v) => v.hash(state),
            Value::Bytes(v) => v.hash(state),
            Value::Boolean(v) => v.hash(state),
            Value::Password(v) => v.hash(state),
        }
    }
}

// ============================================================================
// Conversion table
// ============================================================================

/// How a value of one type becomes a value of another.
///
/// Keyed by `(source type, target type)` so that a call site can decide
/// whether a conversion exists before it has a value in hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Same type. The value is returned unchanged.
    Identity,
    /// Credential to binary: the raw encoded blob.
    CredentialBlob,
    /// Credential to text: the fixed mask.
    CredentialMask,
    /// Binary to credential: the blob is decoded and validated.
    DecodeCredential,
    /// Text to binary: the UTF-8 bytes.
    Utf8Bytes,
    /// Integer to a wider or narrower integer, or to real. Range-checked.
    Numeric,
    /// Scalar to its text rendering.
    Render,
    /// Text parsed as a scalar.
    Parse,
    /// No mapping exists.
    Unsupported,
}

impl Conversion {
    /// Looks up the conversion from `from` to `to`.
    pub fn between(from: DataType, to: DataType) -> Self {
        use DataType as T;

        if from == to {
            return Conversion::Identity;
        }

        match (from, to) {
            (T::Password, T::Bytes) => Conversion::CredentialBlob,
            (T::Password, T::Text) => Conversion::CredentialMask,
            (T::Password, _) => Conversion::Unsupported,
            (T::Bytes, T::Password) => Conversion::DecodeCredential,
            // Text is never hashed or parsed into a credential implicitly.
            (_, T::Password) => Conversion::Unsupported,
            (T::Text, T::Bytes) => Conversion::Utf8Bytes,
            (f, t) if f.is_integer() && (t.is_integer() || t == T::Real) => Conversion::Numeric,
            (
                T::TinyInt | T::SmallInt | T::Integer | T::BigInt | T::Real | T::Boolean,
                T::Text,
            ) => Conversion::Render,
            (
                T::Text,
                T::TinyInt | T::SmallInt | T::Integer | T::BigInt | T::Real | T::Boolean,
            ) => Conversion::Parse,
            _ => Conversion::Unsupported,
        }
    }

    /// Returns true if a value can go through this conversion.
    pub const fn is_supported(self) -> bool {
        !matches!(self, Conversion::Unsupported)
    }
}

impl Value {
    /// Returns the data type of this value.
    ///
    /// Returns `None` for `Null` since it has no concrete type.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::TinyInt(_) => Some(DataType::TinyInt),
            Value::SmallInt(_) => Some(DataType::SmallInt),
            Value::Integer(_) => Some(DataType::Integer),
            Value::BigInt(_) => Some(DataType::BigInt),
            Value::Real(_) => Some(DataType::Real),
            Value::Text(_) => Some(DataType::Text),
            Value::Bytes(_) => Some(DataType::Bytes),
            Value::Boolean(_) => Some(DataType::Boolean),
            Value::Password(_) => Some(DataType::Password),
        }
    }

    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns any integer value widened to i64.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::TinyInt(v) => Some(i64::from(*v)),
            Value::SmallInt(v) => Some(i64::from(*v)),
            Value::Integer(v) => Some(i64::from(*v)),
            Value::BigInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the value as a string slice, if it is Text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as bytes, if it is Bytes.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the value as a bool, if it is Boolean.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the value as a credential, if it is Password.
    pub fn as_password(&self) -> Option<&PasswordHash> {
        match self {
            Value::Password(p) => Some(p),
            _ => None,
        }
    }

    /// Converts this value to `target` following the [`Conversion`] table.
    ///
    /// NULL converts to NULL for every target.
    pub fn convert_to(&self, target: DataType) -> Result<Value> {
        let Some(from) = self.data_type() else {
            return Ok(Value::Null);
        };

        match (Conversion::between(from, target), self) {
            (Conversion::Identity, value) => Ok(value.clone()),
            (Conversion::CredentialBlob, Value::Password(p)) => Ok(Value::Bytes(p.encoded().clone())),
            (Conversion::CredentialMask, Value::Password(_)) => {
                Ok(Value::Text(MASKED_PASSWORD.to_string()))
            }
            (Conversion::DecodeCredential, Value::Bytes(b)) => {
                Ok(Value::Password(PasswordHash::from_bytes(b.clone())?))
            }
            (Conversion::Utf8Bytes, Value::Text(s)) => {
                Ok(Value::Bytes(Bytes::copy_from_slice(s.as_bytes())))
            }
            (Conversion::Numeric, value) => convert_numeric(value, target),
            (Conversion::Render, value) => Ok(Value::Text(render_scalar(value))),
            (Conversion::Parse, Value::Text(s)) => parse_text(s, target),
            _ => Err(QueryError::UnsupportedConversion { from, to: target }),
        }
    }

    /// Compares two values for ordering.
    ///
    /// NULL values are considered less than all non-NULL values.
    /// Values of different types return None (incomparable), and so does
    /// any comparison involving a credential.
    ///
    /// For `Real` values, uses IEEE 754 total ordering.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Password(_), _) | (_, Value::Password(_)) => None,
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Null, _) => Some(Ordering::Less),
            (_, Value::Null) => Some(Ordering::Greater),
            (Value::TinyInt(a), Value::TinyInt(b)) => Some(a.cmp(b)),
            (Value::SmallInt(a), Value::SmallInt(b)) => Some(a.cmp(b)),
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::BigInt(a), Value::BigInt(b)) => Some(a.cmp(b)),
            (Value::Real(a), Value::Real(b)) => Some(a.total_cmp(b)),
            (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.as_ref().cmp(b.as_ref())),
            (Value::Boolean(a), Value::Boolean(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    /// Like [`Value::compare`], but reports why two values cannot be ordered.
    pub fn try_compare(&self, other: &Value) -> Result<Ordering> {
        if matches!(self, Value::Password(_)) || matches!(other, Value::Password(_)) {
            return Err(QueryError::InvalidValue(
                "PASSWORD is not orderable".to_string(),
            ));
        }

        self.compare(other).ok_or_else(|| QueryError::TypeMismatch {
            expected: type_label(self.data_type()),
            actual: type_label(other.data_type()),
        })
    }

    /// Checks if this value can be assigned to a column of the given type.
    pub fn is_compatible_with(&self, data_type: DataType) -> bool {
        self.data_type().is_none_or(|dt| dt == data_type)
    }

    /// Converts this value to JSON. Credentials become the mask.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::TinyInt(v) => serde_json::Value::Number((*v).into()),
            Value::SmallInt(v) => serde_json::Value::Number((*v).into()),
            Value::Integer(v) => serde_json::Value::Number((*v).into()),
            Value::BigInt(v) => serde_json::Value::Number((*v).into()),
            Value::Real(v) => {
                serde_json::Number::from_f64(*v)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number) // NaN/Inf become null
            }
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Bytes(b) => {
                use base64::Engine;
                let encoded = base64::engine::general_purpose::STANDARD.encode(b);
                serde_json::Value::String(encoded)
            }
            Value::Boolean(b) => serde_json::Value::Bool(*b),
            Value::Password(_) => serde_json::Value::String(MASKED_PASSWORD.to_string()),
        }
    }

    /// Parses a value from JSON with an expected data type.
    ///
    /// A `Password` is read from the base64 encoding of its stored blob.
    pub fn from_json(json: &serde_json::Value, data_type: DataType) -> Result<Self> {
        match (json, data_type) {
            (serde_json::Value::Null, _) => Ok(Value::Null),
            (serde_json::Value::Number(n), dt) if dt.is_integer() => {
                let wide = n.as_i64().map(Value::BigInt).ok_or_else(|| {
                    QueryError::TypeMismatch {
                        expected: dt.to_string(),
                        actual: format!("number {n}"),
                    }
                })?;
                convert_numeric(&wide, dt)
            }
            (serde_json::Value::Number(n), DataType::Real) => n
                .as_f64()
                .map(Value::Real)
                .ok_or_else(|| QueryError::TypeMismatch {
                    expected: "real (f64)".to_string(),
                    actual: format!("number {n}"),
                }),
            (serde_json::Value::String(s), DataType::Text) => Ok(Value::Text(s.clone())),
            (serde_json::Value::String(s), DataType::Bytes | DataType::Password) => {
                use base64::Engine;
                let decoded = base64::engine::general_purpose::STANDARD
                    .decode(s)
                    .map_err(|e| QueryError::TypeMismatch {
                        expected: format!("base64 {data_type}"),
                        actual: e.to_string(),
                    })?;
                Value::Bytes(Bytes::from(decoded)).convert_to(data_type)
            }
            (serde_json::Value::Bool(b), DataType::Boolean) => Ok(Value::Boolean(*b)),
            (json, dt) => Err(QueryError::TypeMismatch {
                expected: dt.to_string(),
                actual: json_kind(json).to_string(),
            }),
        }
    }
}

fn type_label(data_type: Option<DataType>) -> String {
    data_type.map_or_else(|| "NULL".to_string(), |dt| dt.to_string())
}

fn json_kind(json: &serde_json::Value) -> &'static str {
    match json {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[allow(clippy::cast_precision_loss)]
fn convert_numeric(value: &Value, target: DataType) -> Result<Value> {
    let from = value.data_type().unwrap_or(target);
    let Some(n) = value.as_i64() else {
        return Err(QueryError::UnsupportedConversion { from, to: target });
    };
    let out_of_range = || QueryError::InvalidValue(format!("{n} is out of range for {target}"));

    Ok(match target {
        DataType::TinyInt => Value::TinyInt(i8::try_from(n).map_err(|_| out_of_range())?),
        DataType::SmallInt => Value::SmallInt(i16::try_from(n).map_err(|_| out_of_range())?),
        DataType::Integer => Value::Integer(i32::try_from(n).map_err(|_| out_of_range())?),
        DataType::BigInt => Value::BigInt(n),
        DataType::Real => Value::Real(n as f64),
        _ => return Err(QueryError::UnsupportedConversion { from, to: target }),
    })
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Boolean(true) => "TRUE".to_string(),
        Value::Boolean(false) => "FALSE".to_string(),
        other => other.to_string(),
    }
}

/// Parses text into a scalar. The text itself never appears in the error:
/// it may be a plaintext credential on its way to `TO_PASSWORD`.
fn parse_text(s: &str, target: DataType) -> Result<Value> {
    let trimmed = s.trim();
    let mismatch = || QueryError::TypeMismatch {
        expected: target.to_string(),
        actual: "VARCHAR that does not parse".to_string(),
    };

    match target {
        DataType::TinyInt => trimmed.parse().map(Value::TinyInt).map_err(|_| mismatch()),
        DataType::SmallInt => trimmed.parse().map(Value::SmallInt).map_err(|_| mismatch()),
        DataType::Integer => trimmed.parse().map(Value::Integer).map_err(|_| mismatch()),
        DataType::BigInt => trimmed.parse().map(Value::BigInt).map_err(|_| mismatch()),
        DataType::Real => trimmed.parse().map(Value::Real).map_err(|_| mismatch()),
        DataType::Boolean => match trimmed.to_ascii_uppercase().as_str() {
            "TRUE" | "T" | "YES" | "1" => Ok(Value::Boolean(true)),
            "FALSE" | "F" | "NO" | "0" => Ok(Value::Boolean(false)),
            _ => Err(mismatch()),
        },
        _ => Err(QueryError::UnsupportedConversion {
            from: DataType::Text,
            to: target,
        }),
    }
}

fn serialize_masked<S>(_: &PasswordHash, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(MASKED_PASSWORD)
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::TinyInt(v) => write!(f, "{v}"),
            Value::SmallInt(v) => write!(f, "{v}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::BigInt(v) => write!(f, "{v}"),
            Value::Real(v) => write!(f, "{v}"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Password(_) => f.write_str(MASKED_PASSWORD),
        }
    }
}

impl From<i8> for Value {
    fn from(v: i8) -> Self {
        Value::TinyInt(v)
    }
}

impl From<i16> for Value {
    fn from(v: i16) -> Self {
        Value::SmallInt(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::BigInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Value::Bytes(b)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(b))
    }
}

impl From<PasswordHash> for Value {
    fn from(p: PasswordHash) -> Self {
        Value::Password(p)
    }
}

/// Serde module for base64 encoding of bytes.
mod bytes_base64 {
    use base64::Engine;
    use bytes::Bytes;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Bytes, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
        serializer.serialize_str(&encoded)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Bytes, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(&s)
            .map_err(serde::de::Error::custom)?;
        Ok(Bytes::from(decoded))
    }
}
