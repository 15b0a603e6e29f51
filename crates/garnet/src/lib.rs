//! # Garnet
//!
//! Salted, versioned `PASSWORD` values and the SQL functions around them.
//!
//! Garnet gives a SQL engine a credential type that can be stored, compared
//! and converted without ever exposing plaintext or hash material:
//!
//! - **Self-describing blobs** - version, algorithm, cost and salt travel
//!   with every hash, so old credentials keep verifying after a cost change
//! - **Constant-time verification** - PBKDF2-HMAC-SHA-256 re-derivation
//!   compared without early exit
//! - **Masked rendering** - every textual channel prints `*PASSWORD*`
//! - **Block cipher functions** - stateless `ENCRYPT`/`DECRYPT` with AES and
//!   XTEA
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                         Garnet                           │
//! │  ┌──────────┐   ┌──────────────┐   ┌──────────────────┐  │
//! │  │  Config  │ → │    Query     │ → │      Crypto      │  │
//! │  │ (layers) │   │ (values, fn) │   │ (kdf, blob, aes) │  │
//! │  └──────────┘   └──────────────┘   └──────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use garnet::{Garnet, Value};
//!
//! let garnet = Garnet::development()?;
//!
//! let stored = garnet.call("TO_PASSWORD", &[Value::from("hunter2"), Value::from(10i64)])?;
//! assert_eq!(
//!     garnet.call("PASSWORD_VERIFY", &[Value::from("hunter2"), stored.clone()])?,
//!     Value::Boolean(true)
//! );
//! assert_eq!(
//!     garnet.call("PASSWORD_ALGO", &[stored])?,
//!     Value::from("PBKDF2-HMAC-SHA256")
//! );
//! # Ok::<(), garnet::GarnetError>(())
//! ```

mod error;
mod garnet;
mod logging;

// SDK Layer - Main API
pub use error::{GarnetError, Result};
pub use garnet::Garnet;
pub use logging::{env_filter, init_tracing};

// Re-export configuration
pub use garnet_config::{ConfigLoader, GarnetConfig, LoggingConfig, PasswordConfig};

// Re-export credential primitives
pub use garnet_crypto::{
    BlockCipherKind, CryptoError, MASKED_PASSWORD, OsSaltSource, PasswordHash, PasswordHasher,
    PasswordPolicy, SaltSource,
};

// Re-export the value system and function bridge
pub use garnet_query::{
    Conversion, DataType, Folded, FunctionContext, Operand, QueryError, SqlFunction, Value,
};
