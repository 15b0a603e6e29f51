//! Cross-module tests for garnet-query.

#![allow(clippy::unwrap_used)] // Tests use unwrap for simplicity


use std::sync::Arc;

use garnet_crypto::{OsSaltSource, PasswordHasher, PasswordPolicy};

use crate::FunctionContext;

/// Context with the cheapest cost so derivation stays fast under proptest.
pub(crate) fn fast_context() -> FunctionContext {
    let policy = PasswordPolicy::new(0, 8).unwrap();
    FunctionContext::new(PasswordHasher::new(policy, Arc::new(OsSaltSource)))
}
