//! SQL-callable credential and cipher functions.
//!
//! | Function                              | Result      | Deterministic |
//! |---------------------------------------|-------------|---------------|
//! | `TO_PASSWORD(text [, int])`           | `PASSWORD`  | no            |
//! | `PASSWORD_VERIFY(text, credential)`   | `BOOLEAN`   | yes           |
//! | `PASSWORD_ALGO(credential)`           | `VARCHAR`   | yes           |
//! | `ENCRYPT(text, binary, binary)`       | `VARBINARY` | yes           |
//! | `DECRYPT(text, binary, binary)`       | `VARBINARY` | yes           |
//!
//! Result types are fixed, so a call can be type-checked from its argument
//! types alone. Any NULL argument makes the result NULL.

use std::fmt::{self, Display};
use std::str::FromStr;

use bytes::Bytes;
use garnet_crypto::{PasswordHash, PasswordHasher, block_cipher};
use tracing::{debug, instrument};

use crate::error::{QueryError, Result};
use crate::schema::DataType;
use crate::value::{Conversion, Value};

/// A function argument slot.
#[derive(Debug, Clone, Copy)]
struct Parameter {
    data_type: DataType,
    /// Only an exact type match is accepted, no coercion.
    exact: bool,
}

const fn exact(data_type: DataType) -> Parameter {
    Parameter {
        data_type,
        exact: true,
    }
}

const fn coerced(data_type: DataType) -> Parameter {
    Parameter {
        data_type,
        exact: false,
    }
}

const TO_PASSWORD_PARAMS: &[Parameter] = &[exact(DataType::Text), coerced(DataType::BigInt)];
const PASSWORD_VERIFY_PARAMS: &[Parameter] =
    &[exact(DataType::Text), coerced(DataType::Password)];
const PASSWORD_ALGO_PARAMS: &[Parameter] = &[coerced(DataType::Password)];
const CIPHER_PARAMS: &[Parameter] = &[
    coerced(DataType::Text),
    coerced(DataType::Bytes),
    coerced(DataType::Bytes),
];

/// The functions exposed to SQL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlFunction {
    ToPassword,
    PasswordVerify,
    PasswordAlgo,
    Encrypt,
    Decrypt,
}

impl SqlFunction {
    pub const ALL: [SqlFunction; 5] = [
        SqlFunction::ToPassword,
        SqlFunction::PasswordVerify,
        SqlFunction::PasswordAlgo,
        SqlFunction::Encrypt,
        SqlFunction::Decrypt,
    ];

    /// Resolves a function by name, ignoring case.
    pub fn from_name(name: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| QueryError::UnknownFunction(name.to_string()))
    }

    pub const fn name(self) -> &'static str {
        match self {
            SqlFunction::ToPassword => "TO_PASSWORD",
            SqlFunction::PasswordVerify => "PASSWORD_VERIFY",
            SqlFunction::PasswordAlgo => "PASSWORD_ALGO",
            SqlFunction::Encrypt => "ENCRYPT",
            SqlFunction::Decrypt => "DECRYPT",
        }
    }

    /// Minimum and maximum argument counts.
    pub const fn arity(self) -> (usize, usize) {
        match self {
            SqlFunction::ToPassword => (1, 2),
            SqlFunction::PasswordVerify => (2, 2),
            SqlFunction::PasswordAlgo => (1, 1),
            SqlFunction::Encrypt | SqlFunction::Decrypt => (3, 3),
        }
    }

    /// The result type, independent of the argument types.
    pub const fn return_type(self) -> DataType {
        match self {
            SqlFunction::ToPassword => DataType::Password,
            SqlFunction::PasswordVerify => DataType::Boolean,
            SqlFunction::PasswordAlgo => DataType::Text,
            SqlFunction::Encrypt | SqlFunction::Decrypt => DataType::Bytes,
        }
    }

    /// Returns false for functions whose result differs between calls with
    /// identical arguments. Those are never constant-folded.
    pub const fn is_deterministic(self) -> bool {
        !matches!(self, SqlFunction::ToPassword)
    }

    const fn parameters(self) -> &'static [Parameter] {
        match self {
            SqlFunction::ToPassword => TO_PASSWORD_PARAMS,
            SqlFunction::PasswordVerify => PASSWORD_VERIFY_PARAMS,
            SqlFunction::PasswordAlgo => PASSWORD_ALGO_PARAMS,
            SqlFunction::Encrypt | SqlFunction::Decrypt => CIPHER_PARAMS,
        }
    }

    /// Fails unless `count` arguments are accepted.
    pub fn check_arity(self, count: usize) -> Result<()> {
        let (min, max) = self.arity();
        if (min..=max).contains(&count) {
            return Ok(());
        }

        let expected = if min == max {
            min.to_string()
        } else {
            format!("{min} to {max}")
        };
        Err(QueryError::ArgumentCount {
            function: self.name(),
            expected,
            actual: count,
        })
    }

    /// Type-checks a call and returns its result type.
    ///
    /// `None` stands for a NULL argument, which every position accepts.
    pub fn check_types(self, arg_types: &[Option<DataType>]) -> Result<DataType> {
        self.check_arity(arg_types.len())?;

        for (i, (param, arg)) in self.parameters().iter().zip(arg_types).enumerate() {
            let Some(actual) = *arg else {
                continue;
            };
            let accepted = if param.exact {
                actual == param.data_type
            } else {
                Conversion::between(actual, param.data_type).is_supported()
            };
            if !accepted {
                return Err(QueryError::argument_type(
                    self.name(),
                    i + 1,
                    param.data_type,
                    Some(actual),
                ));
            }
        }

        Ok(self.return_type())
    }

    /// Evaluates the function over literal arguments.
    #[instrument(level = "debug", skip_all, fields(function = self.name()))]
    pub fn evaluate(self, args: &[Value], ctx: &FunctionContext) -> Result<Value> {
        let arg_types: Vec<Option<DataType>> = args.iter().map(Value::data_type).collect();
        debug!(?arg_types, "evaluating");
        self.check_types(&arg_types)?;

        if args.iter().any(Value::is_null) {
            return Ok(Value::Null);
        }

        let args = Arguments::coerce(self, args)?;
        let result = match self {
            SqlFunction::ToPassword => {
                let cost = if args.len() > 1 {
                    Some(args.integer(1)?)
                } else {
                    None
                };
                let credential = ctx.hasher.hash(args.text(0)?.as_bytes(), cost)?;
                Value::Password(credential)
            }
            SqlFunction::PasswordVerify => {
                let plaintext = args.text(0)?;
                Value::Boolean(args.credential(1)?.verify(plaintext.as_bytes())?)
            }
            SqlFunction::PasswordAlgo => Value::Text(args.credential(0)?.algorithm_name()),
            SqlFunction::Encrypt => Value::Bytes(Bytes::from(block_cipher::encrypt(
                args.text(0)?,
                args.bytes(1)?,
                args.bytes(2)?,
            )?)),
            SqlFunction::Decrypt => Value::Bytes(Bytes::from(block_cipher::decrypt(
                args.text(0)?,
                args.bytes(1)?,
                args.bytes(2)?,
            )?)),
        };

        Ok(result)
    }
}

impl Display for SqlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlFunction {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

/// Arguments converted to their parameter types.
struct Arguments {
    function: SqlFunction,
    values: Vec<Value>,
}

impl Arguments {
    fn coerce(function: SqlFunction, args: &[Value]) -> Result<Self> {
        let values = function
            .parameters()
            .iter()
            .zip(args)
            .map(|(param, value)| value.convert_to(param.data_type))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { function, values })
    }

    fn len(&self) -> usize {
        self.values.len()
    }

    fn mismatch(&self, index: usize, expected: DataType) -> QueryError {
        let actual = self.values.get(index).and_then(Value::data_type);
        QueryError::argument_type(self.function.name(), index + 1, expected, actual)
    }

    fn text(&self, index: usize) -> Result<&str> {
        self.values
            .get(index)
            .and_then(Value::as_text)
            .ok_or_else(|| self.mismatch(index, DataType::Text))
    }

    fn bytes(&self, index: usize) -> Result<&[u8]> {
        self.values
            .get(index)
            .and_then(Value::as_bytes)
            .map(|b| &b[..])
            .ok_or_else(|| self.mismatch(index, DataType::Bytes))
    }

    fn integer(&self, index: usize) -> Result<i64> {
        self.values
            .get(index)
            .and_then(Value::as_i64)
            .ok_or_else(|| self.mismatch(index, DataType::BigInt))
    }

    fn credential(&self, index: usize) -> Result<&PasswordHash> {
        self.values
            .get(index)
            .and_then(Value::as_password)
            .ok_or_else(|| self.mismatch(index, DataType::Password))
    }
}

// ============================================================================
// Evaluation context
// ============================================================================

/// State shared by every function call of a session.
///
/// Holds the credential hasher and with it the salt source. Cloning is
/// cheap and clones share the salt source.
#[derive(Debug, Clone, Default)]
pub struct FunctionContext {
    hasher: PasswordHasher,
}

impl FunctionContext {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &PasswordHasher {
        &self.hasher
    }

    /// Resolves `name` and evaluates it over `args`.
    pub fn call(&self, name: &str, args: &[Value]) -> Result<Value> {
        SqlFunction::from_name(name)?.evaluate(args, self)
    }
}

// ============================================================================
// Constant folding
// ============================================================================

/// A function argument before evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A value known at planning time.
    Literal(Value),
    /// A value only known per row, of the given type.
    Column(DataType),
}

impl Operand {
    fn data_type(&self) -> Option<DataType> {
        match self {
            Operand::Literal(v) => v.data_type(),
            Operand::Column(dt) => Some(*dt),
        }
    }
}

/// Outcome of [`fold_constants`].
#[derive(Debug, Clone, PartialEq)]
pub enum Folded {
    /// The call was evaluated at planning time.
    Constant(Value),
    /// The call must run per row.
    Deferred {
        return_type: DataType,
        /// Result length in bytes, when it is known ahead of evaluation.
        length: Option<usize>,
    },
}

/// Type-checks a call and evaluates it ahead of time when that is sound.
///
/// A call is folded when every operand is a literal and the function is
/// deterministic, or when any literal operand is NULL. `TO_PASSWORD` over
/// literals is never folded: each evaluation must draw a fresh salt.
pub fn fold_constants(
    function: SqlFunction,
    operands: &[Operand],
    ctx: &FunctionContext,
) -> Result<Folded> {
    let arg_types: Vec<Option<DataType>> = operands.iter().map(Operand::data_type).collect();
    let return_type = function.check_types(&arg_types)?;

    if operands
        .iter()
        .any(|op| matches!(op, Operand::Literal(Value::Null)))
    {
        return Ok(Folded::Constant(Value::Null));
    }

    let literals: Option<Vec<Value>> = operands
        .iter()
        .map(|op| match op {
            Operand::Literal(v) => Some(v.clone()),
            Operand::Column(_) => None,
        })
        .collect();

    match literals {
        Some(args) if function.is_deterministic() => {
            debug!(function = function.name(), "folding constant call");
            function.evaluate(&args, ctx).map(Folded::Constant)
        }
        _ => Ok(Folded::Deferred {
            return_type,
            length: static_length(function, operands),
        }),
    }
}

/// Result length of a cipher call whose data operand is a literal.
fn static_length(function: SqlFunction, operands: &[Operand]) -> Option<usize> {
    if !matches!(function, SqlFunction::Encrypt | SqlFunction::Decrypt) {
        return None;
    }

    match operands.get(2)? {
        Operand::Literal(Value::Bytes(b)) => Some(block_cipher::padded_len(b.len())),
        Operand::Literal(Value::Text(s)) => Some(block_cipher::padded_len(s.len())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use garnet_crypto::{CryptoError, OsSaltSource, PasswordPolicy};
    use std::sync::Arc;
    use test_case::test_case;

    fn ctx() -> FunctionContext {
        let policy = PasswordPolicy::new(0, 16).expect("valid policy");
        FunctionContext::new(PasswordHasher::new(policy, Arc::new(OsSaltSource)))
    }

    fn hashed(ctx: &FunctionContext, plaintext: &str) -> Value {
        ctx.call("TO_PASSWORD", &[Value::from(plaintext)])
            .expect("TO_PASSWORD failed")
    }

    #[test_case("to_password", SqlFunction::ToPassword)]
    #[test_case("Password_Verify", SqlFunction::PasswordVerify)]
    #[test_case(" PASSWORD_ALGO ", SqlFunction::PasswordAlgo)]
    #[test_case("encrypt", SqlFunction::Encrypt)]
    #[test_case("DECRYPT", SqlFunction::Decrypt)]
    fn test_from_name(name: &str, expected: SqlFunction) {
        assert_eq!(SqlFunction::from_name(name).expect("resolve"), expected);
    }

    #[test]
    fn test_unknown_function() {
        assert!(matches!(
            "HASH".parse::<SqlFunction>(),
            Err(QueryError::UnknownFunction(name)) if name == "HASH"
        ));
    }

    #[test]
    fn test_result_types_are_fixed() {
        assert_eq!(SqlFunction::ToPassword.return_type(), DataType::Password);
        assert_eq!(SqlFunction::PasswordVerify.return_type(), DataType::Boolean);
        assert_eq!(SqlFunction::PasswordAlgo.return_type(), DataType::Text);
        assert_eq!(SqlFunction::Encrypt.return_type(), DataType::Bytes);
        assert_eq!(SqlFunction::Decrypt.return_type(), DataType::Bytes);
    }

    #[test_case(SqlFunction::ToPassword, 0)]
    #[test_case(SqlFunction::ToPassword, 3)]
    #[test_case(SqlFunction::PasswordVerify, 1)]
    #[test_case(SqlFunction::Encrypt, 2)]
    fn test_wrong_arity(function: SqlFunction, count: usize) {
        assert!(matches!(
            function.check_arity(count),
            Err(QueryError::ArgumentCount { actual, .. }) if actual == count
        ));
    }

    #[test]
    fn test_check_types_accepts_bytes_as_credential() {
        let result = SqlFunction::PasswordAlgo.check_types(&[Some(DataType::Bytes)]);
        assert_eq!(result.expect("bytes coerce to PASSWORD"), DataType::Text);
    }

    #[test]
    fn test_check_types_rejects_text_as_credential() {
        let err = SqlFunction::PasswordVerify
            .check_types(&[Some(DataType::Text), Some(DataType::Text)])
            .expect_err("text is not a credential");
        assert!(err.to_string().contains("argument 2 of PASSWORD_VERIFY"));
    }

    #[test]
    fn test_to_password_requires_text_plaintext() {
        let err = SqlFunction::ToPassword
            .check_types(&[Some(DataType::Bytes)])
            .expect_err("plaintext must be text");
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_verify_round_trip() {
        let ctx = ctx();
        let stored = hashed(&ctx, "hunter2");
        assert_eq!(stored.data_type(), Some(DataType::Password));

        let ok = ctx
            .call("PASSWORD_VERIFY", &[Value::from("hunter2"), stored.clone()])
            .expect("verify");
        assert_eq!(ok, Value::Boolean(true));

        let bad = ctx
            .call("PASSWORD_VERIFY", &[Value::from("wrong"), stored])
            .expect("verify");
        assert_eq!(bad, Value::Boolean(false));
    }

    #[test]
    fn test_to_password_with_explicit_cost() {
        let ctx = ctx();
        let stored = ctx
            .call("TO_PASSWORD", &[Value::from("pw"), Value::TinyInt(-3)])
            .expect("TO_PASSWORD");
        assert_eq!(stored.as_password().expect("credential").cost(), 0);
    }

    #[test]
    fn test_verify_accepts_stored_blob() {
        let ctx = ctx();
        let stored = hashed(&ctx, "hunter2");
        let blob = stored
            .convert_to(DataType::Bytes)
            .expect("credential to bytes");

        let ok = ctx
            .call("PASSWORD_VERIFY", &[Value::from("hunter2"), blob])
            .expect("verify");
        assert_eq!(ok, Value::Boolean(true));
    }

    #[test]
    fn test_verify_with_text_credential_is_type_mismatch() {
        let err = ctx()
            .call("PASSWORD_VERIFY", &[Value::from("a"), Value::from("b")])
            .expect_err("text is not a credential");
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }

    #[test]
    fn test_algo_with_malformed_blob() {
        let err = ctx()
            .call("PASSWORD_ALGO", &[Value::from(vec![1u8, 1, 0])])
            .expect_err("short blob");
        assert!(matches!(
            err,
            QueryError::Crypto(CryptoError::MalformedCredential { .. })
        ));
    }

    #[test]
    fn test_algo_label() {
        let ctx = ctx();
        let stored = hashed(&ctx, "x");
        assert_eq!(
            ctx.call("PASSWORD_ALGO", &[stored]).expect("algo"),
            Value::Text("PBKDF2-HMAC-SHA256".into())
        );
    }

    #[test_case(SqlFunction::ToPassword, vec![Value::Null])]
    #[test_case(SqlFunction::PasswordVerify, vec![Value::from("x"), Value::Null])]
    #[test_case(SqlFunction::PasswordAlgo, vec![Value::Null])]
    #[test_case(SqlFunction::Encrypt, vec![Value::from("AES"), Value::Null, Value::from(vec![0u8; 16])])]
    fn test_null_propagates(function: SqlFunction, args: Vec<Value>) {
        assert_eq!(function.evaluate(&args, &ctx()).expect("null"), Value::Null);
    }

    #[test]
    fn test_encrypt_decrypt_through_bridge() {
        let ctx = ctx();
        let key = Value::from(vec![7u8; 16]);
        let data = Value::from("attack at dawn");

        let encrypted = ctx
            .call("ENCRYPT", &[Value::from("aes"), key.clone(), data])
            .expect("encrypt");
        let encrypted_len = encrypted.as_bytes().expect("bytes").len();
        assert_eq!(encrypted_len, 16);

        let decrypted = ctx
            .call("DECRYPT", &[Value::from("AES"), key, encrypted])
            .expect("decrypt");
        let decrypted = decrypted.as_bytes().expect("bytes");
        assert_eq!(&decrypted[..14], b"attack at dawn");
        assert!(decrypted[14..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_unknown_cipher() {
        let err = ctx()
            .call(
                "ENCRYPT",
                &[Value::from("FOG"), Value::from(vec![0u8]), Value::from(vec![0u8])],
            )
            .expect_err("FOG is not a cipher");
        assert!(matches!(err, QueryError::Crypto(CryptoError::UnknownCipher(_))));
    }

    #[test]
    fn test_to_password_never_folds() {
        let folded = fold_constants(
            SqlFunction::ToPassword,
            &[Operand::Literal(Value::from("hunter2"))],
            &ctx(),
        )
        .expect("fold");
        assert_eq!(
            folded,
            Folded::Deferred {
                return_type: DataType::Password,
                length: None
            }
        );
    }

    #[test]
    fn test_deterministic_literals_fold() {
        let ctx = ctx();
        let stored = hashed(&ctx, "x");
        let folded = fold_constants(
            SqlFunction::PasswordAlgo,
            &[Operand::Literal(stored)],
            &ctx,
        )
        .expect("fold");
        assert_eq!(
            folded,
            Folded::Constant(Value::Text("PBKDF2-HMAC-SHA256".into()))
        );
    }

    #[test]
    fn test_null_literal_folds_even_for_to_password() {
        let folded = fold_constants(
            SqlFunction::ToPassword,
            &[Operand::Literal(Value::Null)],
            &ctx(),
        )
        .expect("fold");
        assert_eq!(folded, Folded::Constant(Value::Null));
    }

    #[test]
    fn test_cipher_with_column_reports_padded_length() {
        let folded = fold_constants(
            SqlFunction::Encrypt,
            &[
                Operand::Literal(Value::from("XTEA")),
                Operand::Column(DataType::Bytes),
                Operand::Literal(Value::from(vec![1u8; 17])),
            ],
            &ctx(),
        )
        .expect("fold");
        assert_eq!(
            folded,
            Folded::Deferred {
                return_type: DataType::Bytes,
                length: Some(32)
            }
        );
    }

    #[test]
    fn test_fold_type_checks_columns() {
        let err = fold_constants(
            SqlFunction::PasswordAlgo,
            &[Operand::Column(DataType::Integer)],
            &ctx(),
        )
        .expect_err("integer column is not a credential");
        assert!(matches!(err, QueryError::TypeMismatch { .. }));
    }
}
