//! SQL column types

use arrow::datatypes::{DataType, TimeUnit};
use std::fmt;

/// PostgreSQL type a column is written as
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    BigInt,
    DoublePrecision,
    Boolean,
    Text,
    Date,
    Timestamp,
}

impl SqlType {
    /// Map an Arrow type to the SQL type it is stored as
    ///
    /// Anything without a natural counterpart is written as text.
    pub fn from_arrow(data_type: &DataType) -> Self {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => SqlType::BigInt,
            DataType::Float16 | DataType::Float32 | DataType::Float64 => SqlType::DoublePrecision,
            DataType::Boolean => SqlType::Boolean,
            DataType::Date32 | DataType::Date64 => SqlType::Date,
            DataType::Timestamp(_, _) => SqlType::Timestamp,
            _ => SqlType::Text,
        }
    }

    /// The Arrow type values are cast to before encoding
    pub fn arrow_type(self) -> DataType {
        match self {
            SqlType::BigInt => DataType::Int64,
            SqlType::DoublePrecision => DataType::Float64,
            SqlType::Boolean => DataType::Boolean,
            SqlType::Text => DataType::Utf8,
            SqlType::Date => DataType::Date32,
            SqlType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
        }
    }

    /// Type name as written in DDL and casts
    pub fn as_sql(self) -> &'static str {
        match self {
            SqlType::BigInt => "BIGINT",
            SqlType::DoublePrecision => "DOUBLE PRECISION",
            SqlType::Boolean => "BOOLEAN",
            SqlType::Text => "TEXT",
            SqlType::Date => "DATE",
            SqlType::Timestamp => "TIMESTAMP",
        }
    }

    /// Whether a value of this type can be assigned to a column whose
    /// `information_schema.columns.data_type` is `column_type`
    pub fn assignable_to(self, column_type: &str) -> bool {
        let column_type = column_type.to_ascii_lowercase();

        // every type has an assignment cast to the string types
        if matches!(
            column_type.as_str(),
            "text" | "character varying" | "character"
        ) {
            return true;
        }

        match self {
            SqlType::BigInt => matches!(
                column_type.as_str(),
                "bigint" | "integer" | "smallint" | "numeric" | "double precision" | "real"
            ),
            SqlType::DoublePrecision => {
                matches!(column_type.as_str(), "double precision" | "real" | "numeric")
            }
            SqlType::Boolean => column_type == "boolean",
            SqlType::Text => false,
            SqlType::Date | SqlType::Timestamp => matches!(
                column_type.as_str(),
                "date" | "timestamp without time zone" | "timestamp with time zone"
            ),
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}
