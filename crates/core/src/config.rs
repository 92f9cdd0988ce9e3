use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Which level of the recognized-text tree becomes one fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Block,
    Line,
    #[default]
    Element,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Granularity::Block => write!(f, "block"),
            Granularity::Line => write!(f, "line"),
            Granularity::Element => write!(f, "element"),
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "block" => Ok(Granularity::Block),
            "line" => Ok(Granularity::Line),
            "element" => Ok(Granularity::Element),
            other => Err(format!("Unknown granularity: '{other}'")),
        }
    }
}

/// Tunables for receipt field extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Largest plausible receipt total (exclusive).
    pub ceiling: Decimal,
    /// Characters that mark a fragment as a currency amount.
    pub currency_markers: Vec<char>,
    pub granularity: Granularity,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ceiling: Decimal::ONE_HUNDRED,
            currency_markers: vec!['$'],
            granularity: Granularity::Element,
        }
    }
}

impl ExtractorConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        let config: ExtractorConfig = toml::from_str(toml_content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ceiling <= Decimal::ZERO {
            return Err(ConfigError::Invalid(format!(
                "ceiling must be positive, got {}",
                self.ceiling
            )));
        }
        if self.currency_markers.is_empty() {
            return Err(ConfigError::Invalid("currency_markers must not be empty".into()));
        }
        if let Some(m) = self
            .currency_markers
            .iter()
            .find(|c| c.is_ascii_digit() || **c == '.')
        {
            return Err(ConfigError::Invalid(format!(
                "currency marker '{m}' would be kept when normalizing amounts"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn defaults() {
        let c = ExtractorConfig::default();
        assert_eq!(c.ceiling, Decimal::from(100));
        assert_eq!(c.currency_markers, vec!['$']);
        assert_eq!(c.granularity, Granularity::Element);
    }

    #[test]
    fn empty_toml_gives_defaults() {
        assert_eq!(ExtractorConfig::from_toml("").unwrap(), ExtractorConfig::default());
    }

    #[test]
    fn parses_all_fields() {
        let c = ExtractorConfig::from_toml(
            "ceiling = 200\ncurrency_markers = [\"$\", \"€\"]\ngranularity = \"block\"\n",
        )
        .unwrap();
        assert_eq!(c.ceiling, Decimal::from(200));
        assert_eq!(c.currency_markers, vec!['$', '€']);
        assert_eq!(c.granularity, Granularity::Block);
    }

    #[test]
    fn rejects_non_positive_ceiling() {
        assert!(matches!(
            ExtractorConfig::from_toml("ceiling = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ExtractorConfig::from_toml("ceiling = -5"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_empty_or_numeric_markers() {
        assert!(matches!(
            ExtractorConfig::from_toml("currency_markers = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            ExtractorConfig::from_toml("currency_markers = [\"7\"]"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_malformed_toml() {
        assert!(matches!(
            ExtractorConfig::from_toml("ceiling = ["),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = ExtractorConfig::load(Path::new("/nonexistent/tally.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn granularity_from_str() {
        assert_eq!(Granularity::from_str("LINE").unwrap(), Granularity::Line);
        assert!(Granularity::from_str("word").is_err());
        assert_eq!(Granularity::Block.to_string(), "block");
    }
}
