// greenhouse_storefront/src/services/codes.rs

//! Human-readable codes: `<PREFIX>-<yyyy>-<nnnn>`.
//!
//! The sequence comes from the store's atomic (prefix, year) counter, so two
//! concurrent allocations never share a number.

use chrono::{Datelike, Utc};
use std::fmt;

use crate::errors::{AppError, Result};
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodePrefix {
  Quotation,
  Merchant,
}

impl CodePrefix {
  pub fn as_str(self) -> &'static str {
    match self {
      CodePrefix::Quotation => "QTN",
      CodePrefix::Merchant => "MC",
    }
  }

  fn parse(s: &str) -> Option<Self> {
    match s {
      "QTN" => Some(CodePrefix::Quotation),
      "MC" => Some(CodePrefix::Merchant),
      _ => None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Code {
  pub prefix: CodePrefix,
  pub year: i32,
  pub sequence: i64,
}

impl fmt::Display for Code {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}-{:04}-{:04}", self.prefix.as_str(), self.year, self.sequence)
  }
}

pub fn format_code(prefix: CodePrefix, year: i32, sequence: i64) -> String {
  Code { prefix, year, sequence }.to_string()
}

pub fn parse_code(code: &str) -> Result<Code> {
  let invalid = || AppError::Validation(format!("'{}' is not a valid code", code));
  let mut parts = code.splitn(3, '-');
  let (Some(prefix), Some(year), Some(sequence)) = (parts.next(), parts.next(), parts.next()) else {
    return Err(invalid());
  };
  let prefix = CodePrefix::parse(prefix).ok_or_else(invalid)?;
  if year.len() != 4 || sequence.len() < 4 || !sequence.bytes().all(|b| b.is_ascii_digit()) {
    return Err(invalid());
  }
  let year = year.parse::<i32>().map_err(|_| invalid())?;
  let sequence = sequence.parse::<i64>().map_err(|_| invalid())?;
  if sequence < 1 {
    return Err(invalid());
  }
  Ok(Code { prefix, year, sequence })
}

/// Validates that `code` is a well-formed code with the given prefix.
pub fn expect_code(code: &str, prefix: CodePrefix) -> Result<Code> {
  let parsed = parse_code(code)?;
  if parsed.prefix != prefix {
    return Err(AppError::Validation(format!(
      "'{}' is not a {} code",
      code,
      prefix.as_str()
    )));
  }
  Ok(parsed)
}

/// Allocates the next code of `prefix` for the current year.
pub async fn allocate_code(store: &dyn Store, prefix: CodePrefix) -> Result<String> {
  let year = Utc::now().year();
  let sequence = store.next_sequence(prefix.as_str(), year).await?;
  Ok(format_code(prefix, year, sequence))
}
