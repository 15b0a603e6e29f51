#![no_main]

use std::sync::{Arc, OnceLock};

use arbitrary::Arbitrary;
use garnet_crypto::{OsSaltSource, PasswordHasher, PasswordPolicy};
use garnet_query::{FunctionContext, SqlFunction, Value};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Arg {
    Null,
    Int(i64),
    Text(String),
    Bytes(Vec<u8>),
    Bool(bool),
    /// A fresh credential over the given plaintext.
    Credential(String),
}

#[derive(Debug, Arbitrary)]
struct Call {
    function: u8,
    args: Vec<Arg>,
}

fn context() -> &'static FunctionContext {
    static CTX: OnceLock<FunctionContext> = OnceLock::new();
    CTX.get_or_init(|| {
        let policy = PasswordPolicy::new(0, 8).expect("valid policy");
        FunctionContext::new(PasswordHasher::new(policy, Arc::new(OsSaltSource)))
    })
}

fuzz_target!(|call: Call| {
    let ctx = context();
    let function = SqlFunction::ALL[usize::from(call.function) % SqlFunction::ALL.len()];

    let args: Vec<Value> = call
        .args
        .into_iter()
        .take(4)
        .map(|arg| match arg {
            Arg::Null => Value::Null,
            // Keep TO_PASSWORD costs cheap.
            Arg::Int(v) => Value::BigInt(v.clamp(-5, 1)),
            Arg::Text(s) => Value::Text(s),
            Arg::Bytes(b) => Value::from(b),
            Arg::Bool(b) => Value::Boolean(b),
            Arg::Credential(p) => ctx
                .call("TO_PASSWORD", &[Value::Text(p)])
                .expect("TO_PASSWORD over text"),
        })
        .collect();

    let arg_types: Vec<_> = args.iter().map(Value::data_type).collect();
    let checked = function.check_types(&arg_types);

    let Ok(result) = function.evaluate(&args, ctx) else {
        return;
    };

    // Type checking before evaluation is never stricter than evaluation.
    let return_type = checked.expect("evaluated call must type-check");
    if let Some(actual) = result.data_type() {
        assert_eq!(actual, return_type);
    }
    // Credentials never render their contents.
    if result.as_password().is_some() {
        assert_eq!(result.to_string(), "*PASSWORD*");
    }
});
