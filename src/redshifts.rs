use std::{num::ParseFloatError, ops::Deref, sync::LazyLock};

use itertools::Itertools;
use regex::Regex;

#[derive(Debug, thiserror::Error)]
pub enum RedshiftError {
    #[error("no redshift found in {0:?}")]
    Empty(String),
    #[error("{0:?} is not a redshift")]
    Token(String, #[source] ParseFloatError),
    #[error("invalid source redshift {0}, expected a finite value >= 0")]
    Invalid(f64),
}
type Result<T> = std::result::Result<T, RedshiftError>;

/// Runs of characters that cannot be part of a number
static DELIMITER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9eE+\-.]+").expect("valid delimiter regex"));

/// Ordered list of source redshifts
#[derive(Debug, Clone, PartialEq)]
pub struct RedshiftList(Vec<f64>);
impl RedshiftList {
    /// Resolves the source redshifts from the optional `redshifts` parameter
    ///
    /// The values can be separated by any character that is not part of a number,
    /// e.g. `"0.5,1.0,2.0"` or `"0.5 1 2"`.
    /// If the parameter is missing or blank, the list is the `fallback` redshift.
    pub fn resolve(raw: Option<&str>, fallback: f64) -> Result<Self> {
        match raw.map(str::trim).filter(|raw| !raw.is_empty()) {
            Some(raw) => Self::parse(raw),
            None => Ok(Self(vec![check(fallback)?])),
        }
    }
    fn parse(raw: &str) -> Result<Self> {
        let redshifts = DELIMITER
            .split(raw)
            .filter(|token| !token.is_empty())
            .map(|token| {
                token
                    .parse::<f64>()
                    .map_err(|e| RedshiftError::Token(token.to_string(), e))
                    .and_then(check)
            })
            .collect::<Result<Vec<f64>>>()?;
        if redshifts.is_empty() {
            Err(RedshiftError::Empty(raw.to_string()))
        } else {
            Ok(Self(redshifts))
        }
    }
}
fn check(z: f64) -> Result<f64> {
    if z.is_finite() && z >= 0. {
        // -0 becomes 0
        Ok(z + 0.)
    } else {
        Err(RedshiftError::Invalid(z))
    }
}
impl Deref for RedshiftList {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
impl<'a> IntoIterator for &'a RedshiftList {
    type Item = &'a f64;
    type IntoIter = std::slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
impl std::fmt::Display for RedshiftList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join(" "))
    }
}
