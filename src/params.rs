//! Parameter file
//!
//! One `key value` pair per line, the value being the rest of the line.
//! Everything after a `#` is a comment.
//!
//! ```text
//! # output
//! outputfile  maps/run1
//! redshifts   0.5, 1.0, 2.0
//! ```

use std::{collections::BTreeMap, fmt::Display, fs, path::Path, str::FromStr};

use crate::lens::ConfigSource;

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("failed to read parameter file {1}")]
    Read(#[source] std::io::Error, String),
    #[error("missing parameter `{0}`")]
    Missing(String),
    #[error("invalid value {value:?} for parameter `{key}`: {reason}")]
    Invalid {
        key: String,
        value: String,
        reason: String,
    },
}
type Result<T> = std::result::Result<T, ParamsError>;

/// Key/value parameters
#[derive(Debug, Default, Clone)]
pub struct ParamFile {
    params: BTreeMap<String, String>,
}
impl ParamFile {
    /// Loads the parameters from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        log::info!("Loading parameters from {:?}", path);
        let contents = fs::read_to_string(path)
            .map_err(|e| ParamsError::Read(e, path.display().to_string()))?;
        contents.parse()
    }
    /// Sets a parameter, replacing any previous value
    pub fn set(mut self, key: impl ToString, value: impl ToString) -> Self {
        self.params.insert(key.to_string(), value.to_string());
        self
    }
    /// Returns the raw value of a parameter
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }
    /// Returns the raw value of a parameter or an error if it is missing
    pub fn require(&self, key: &str) -> Result<&str> {
        self.get(key)
            .ok_or_else(|| ParamsError::Missing(key.to_string()))
    }
    /// Parses the value of a parameter if it is present
    pub fn get_parsed<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get(key)
            .map(|value| {
                value.parse::<T>().map_err(|e| ParamsError::Invalid {
                    key: key.to_string(),
                    value: value.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
    /// Parses the value of a parameter that must be present
    pub fn require_parsed<T>(&self, key: &str) -> Result<T>
    where
        T: FromStr,
        T::Err: Display,
    {
        self.get_parsed(key)?
            .ok_or_else(|| ParamsError::Missing(key.to_string()))
    }
    pub fn len(&self) -> usize {
        self.params.len()
    }
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
impl FromStr for ParamFile {
    type Err = ParamsError;

    fn from_str(contents: &str) -> Result<Self> {
        let mut params = BTreeMap::new();
        for line in contents.lines() {
            let line = match line.split_once('#') {
                Some((content, _comment)) => content,
                None => line,
            }
            .trim();
            if line.is_empty() {
                continue;
            }
            let (key, value) = match line.split_once(char::is_whitespace) {
                Some((key, value)) => (key, value.trim()),
                None => (line, ""),
            };
            if let Some(previous) = params.insert(key.to_string(), value.to_string()) {
                log::warn!("parameter `{key}` redefined, {previous:?} replaced by {value:?}");
            }
        }
        Ok(Self { params })
    }
}
impl ConfigSource for ParamFile {
    fn get(&self, key: &str) -> Option<&str> {
        ParamFile::get(self, key)
    }
}
