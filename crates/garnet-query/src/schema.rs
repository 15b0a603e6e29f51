//! SQL data types.

use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// SQL data types understood by the value system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    // ===== Integer Types =====
    TinyInt,
    SmallInt,
    Integer,
    BigInt,

    // ===== Numeric Types =====
    Real,

    // ===== String Types =====
    Text,

    // ===== Binary Types =====
    Bytes,

    // ===== Boolean Type =====
    Boolean,

    // ===== Credential Type =====
    /// Salted, versioned password hash. Opaque to everything except the
    /// password functions.
    Password,
}

impl DataType {
    /// Canonical SQL spelling.
    pub const fn sql_name(self) -> &'static str {
        match self {
            DataType::TinyInt => "TINYINT",
            DataType::SmallInt => "SMALLINT",
            DataType::Integer => "INTEGER",
            DataType::BigInt => "BIGINT",
            DataType::Real => "REAL",
            DataType::Text => "VARCHAR",
            DataType::Bytes => "VARBINARY",
            DataType::Boolean => "BOOLEAN",
            DataType::Password => "PASSWORD",
        }
    }

    /// Resolves a SQL type name, accepting common aliases.
    pub fn from_sql_name(name: &str) -> Option<Self> {
        let upper = name.trim().to_ascii_uppercase();
        let data_type = match upper.as_str() {
            "TINYINT" => DataType::TinyInt,
            "SMALLINT" => DataType::SmallInt,
            "INT" | "INTEGER" => DataType::Integer,
            "BIGINT" => DataType::BigInt,
            "REAL" | "DOUBLE" | "FLOAT" => DataType::Real,
            "TEXT" | "VARCHAR" | "CHARACTER VARYING" => DataType::Text,
            "BYTEA" | "BINARY" | "VARBINARY" | "BINARY VARYING" => DataType::Bytes,
            "BOOL" | "BOOLEAN" => DataType::Boolean,
            "PASSWORD" => DataType::Password,
            _ => return None,
        };
        Some(data_type)
    }

    /// Returns true for the four fixed-width integer types.
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            DataType::TinyInt | DataType::SmallInt | DataType::Integer | DataType::BigInt
        )
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("varchar", DataType::Text)]
    #[test_case(" Text ", DataType::Text)]
    #[test_case("BYTEA", DataType::Bytes)]
    #[test_case("int", DataType::Integer)]
    #[test_case("password", DataType::Password)]
    fn test_from_sql_name_aliases(name: &str, expected: DataType) {
        assert_eq!(DataType::from_sql_name(name), Some(expected));
    }

    #[test]
    fn test_from_sql_name_unknown() {
        assert_eq!(DataType::from_sql_name("GEOMETRY"), None);
    }

    #[test]
    fn test_sql_name_round_trips() {
        for dt in [
            DataType::TinyInt,
            DataType::SmallInt,
            DataType::Integer,
            DataType::BigInt,
            DataType::Real,
            DataType::Text,
            DataType::Bytes,
            DataType::Boolean,
            DataType::Password,
        ] {
            assert_eq!(DataType::from_sql_name(dt.sql_name()), Some(dt));
        }
    }
}
