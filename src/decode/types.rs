//! CSV reading options

use crate::error::{Error, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Options applied to every input file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter (default: comma)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,

    /// Cell values read as null. The World Bank exports use `..`
    #[serde(default = "default_null_values")]
    pub null_values: Vec<String>,

    /// Rows sampled for type inference (`None` = the whole file)
    #[serde(default)]
    pub infer_schema_rows: Option<usize>,

    /// Rows per Arrow batch while decoding
    #[serde(default = "default_read_batch_size")]
    pub read_batch_size: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            null_values: default_null_values(),
            infer_schema_rows: None,
            read_batch_size: default_read_batch_size(),
        }
    }
}

impl CsvOptions {
    /// Create options with a custom delimiter
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Replace the null tokens
    #[must_use]
    pub fn with_null_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.null_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Delimiter as the single byte the CSV reader expects
    pub fn delimiter_byte(&self) -> Result<u8> {
        u8::try_from(self.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                Error::config(format!(
                    "CSV delimiter must be a single ASCII character, got '{}'",
                    self.delimiter
                ))
            })
    }

    /// Regex matching a whole cell that should be read as null
    pub fn null_regex(&self) -> Option<Regex> {
        if self.null_values.is_empty() {
            return None;
        }
        let alternatives: Vec<String> = self.null_values.iter().map(|v| regex::escape(v)).collect();
        Regex::new(&format!("^(?:{})$", alternatives.join("|"))).ok()
    }
}

fn default_delimiter() -> char {
    ','
}

fn default_null_values() -> Vec<String> {
    vec![String::new(), "..".to_string()]
}

fn default_read_batch_size() -> usize {
    8192
}
