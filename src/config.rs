use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::str::FromStr;

/// INI-style configuration: `[section]` headers, `key = value` pairs,
/// `#` comments. Keys before the first header are globals.
#[derive(Debug, Default)]
pub struct Config {
    pub globals: HashMap<String, String>,
    pub sections: HashMap<String, HashMap<String, String>>,
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
    InvalidValue {
        section: String,
        key: String,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "Error reading file {path}: {source}"),
            ConfigError::InvalidValue {
                section,
                key,
                value,
            } => write!(f, "invalid value {value:?} for [{section}] {key}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        Ok(Self::parse(&content))
    }

    /// Parses configuration text. Malformed lines are ignored.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut cfg = Config::empty();
        let mut current_section: Option<String> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                current_section = Some(name.trim().to_string());
                continue;
            }

            if let Some((key, value)) = line.split_once('=') {
                let key = key.trim().to_string();
                let value = value.trim().trim_matches('"').to_string();
                match &current_section {
                    None => {
                        cfg.globals.insert(key, value);
                    }
                    Some(sec) => {
                        cfg.sections
                            .entry(sec.clone())
                            .or_default()
                            .insert(key, value);
                    }
                }
            }
        }
        cfg
    }

    pub fn empty() -> Self {
        Self {
            globals: HashMap::new(),
            sections: HashMap::new(),
        }
    }

    #[must_use]
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|sec| sec.get(key))
            .map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_non_empty(&self, section: &str, key: &str) -> Option<&str> {
        self.get(section, key).filter(|s| !s.is_empty())
    }

    #[must_use]
    pub fn get_global(&self, key: &str) -> Option<&str> {
        self.globals.get(key).map(|s| s.as_str())
    }

    #[must_use]
    pub fn get_or_default<'a>(&'a self, section: &str, key: &str, default: &'a str) -> &'a str {
        self.get(section, key)
            .or_else(|| self.get_global(key))
            .unwrap_or(default)
    }

    /// Parses `[section] key` with `FromStr`. `Ok(None)` when the key is absent
    /// or empty.
    pub fn get_parsed<T: FromStr>(&self, section: &str, key: &str) -> Result<Option<T>, ConfigError> {
        let Some(raw) = self.get_non_empty(section, key) else {
            return Ok(None);
        };
        raw.parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                section: section.to_string(),
                key: key.to_string(),
                value: raw.to_string(),
            })
    }
}
