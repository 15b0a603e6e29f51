//! # garnet-query: SQL values and crypt functions for `Garnet`
//!
//! This crate provides the value system that carries Garnet's `PASSWORD`
//! type through SQL, and the functions that produce and consume it:
//!
//! - [`Value`]: a closed set of SQL values, including credentials
//! - [`Conversion`]: the conversion table keyed by `(source, target)` type
//! - [`SqlFunction`]: `TO_PASSWORD`, `PASSWORD_VERIFY`, `PASSWORD_ALGO`,
//!   `ENCRYPT` and `DECRYPT`
//! - [`fold_constants`]: planning-time evaluation of literal calls
//!
//! ## Usage
//!
//! ```
//! use garnet_query::{FunctionContext, Value};
//!
//! let ctx = FunctionContext::default();
//! let stored = ctx.call("TO_PASSWORD", &[Value::from("hunter2"), Value::from(0i64)])?;
//!
//! let ok = ctx.call("PASSWORD_VERIFY", &[Value::from("hunter2"), stored.clone()])?;
//! assert_eq!(ok, Value::Boolean(true));
//!
//! // Credentials never render their contents.
//! assert_eq!(stored.to_string(), "*PASSWORD*");
//! # Ok::<(), garnet_query::QueryError>(())
//! ```

mod error;
mod functions;
mod schema;
mod value;

#[cfg(test)]
mod tests;

// Re-export public types
pub use error::{QueryError, Result};
pub use functions::{Folded, FunctionContext, Operand, SqlFunction, fold_constants};
pub use schema::DataType;
pub use value::{Conversion, Value};
