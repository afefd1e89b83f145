use crate::survey::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The JSON configuration file of the analyzer. All the fields are optional.
#[derive(PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    #[serde(rename = "singleChoiceMaxDistinct")]
    pub single_choice_max_distinct: Option<usize>,
    #[serde(rename = "singleChoiceMaxRatio")]
    pub single_choice_max_ratio: Option<f64>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
    /// Question identifier -> human-readable label.
    #[serde(default)]
    pub labels: HashMap<String, String>,
}

impl AnalyzerConfig {
    pub fn catalog_rules(&self) -> CatalogRules {
        let defaults = CatalogRules::DEFAULT_RULES;
        CatalogRules {
            single_choice_max_distinct: self
                .single_choice_max_distinct
                .unwrap_or(defaults.single_choice_max_distinct),
            single_choice_max_ratio: self
                .single_choice_max_ratio
                .or(defaults.single_choice_max_ratio),
        }
    }
}

pub fn read_config(path: &str) -> SurveyResult<AnalyzerConfig> {
    let contents = fs::read_to_string(path).context(ConfigReadSnafu { path })?;
    let config: AnalyzerConfig =
        serde_json::from_str(contents.as_str()).context(ConfigParseSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

/// What the `load` command records for the following commands.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub files: Vec<String>,
    #[serde(default)]
    pub config: Option<String>,
}

pub fn read_session(path: &str) -> SurveyResult<Session> {
    let contents = fs::read_to_string(path).context(SessionReadSnafu { path })?;
    serde_json::from_str(contents.as_str()).context(SessionParseSnafu { path })
}

pub fn write_session(path: &str, session: &Session) -> SurveyResult<()> {
    let contents = serde_json::to_string_pretty(session).context(SerializingJsonSnafu {})?;
    fs::write(path, contents).context(SessionWriteSnafu { path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_partial_config() {
        let config: AnalyzerConfig = serde_json::from_str(
            r#"{"singleChoiceMaxDistinct": 20, "labels": {"Age": "How old are you?"}}"#,
        )
        .unwrap();
        assert_eq!(config.single_choice_max_distinct, Some(20));
        assert_eq!(config.excel_worksheet_name, None);
        assert_eq!(config.labels.get("Age").unwrap(), "How old are you?");
        let rules = config.catalog_rules();
        assert_eq!(rules.single_choice_max_distinct, 20);
        assert_eq!(rules.single_choice_max_ratio, None);
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.catalog_rules(), CatalogRules::DEFAULT_RULES);
    }

    #[test]
    fn bad_config_file() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("config.json");
        fs::write(&p, "{\"singleChoiceMaxDistinct\": \"many\"}").unwrap();
        let err = read_config(p.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SurveyError::ConfigParse { .. }));

        let err = read_config(dir.path().join("none.json").to_str().unwrap()).unwrap_err();
        assert!(matches!(err, SurveyError::ConfigRead { .. }));
    }

    #[test]
    fn session_roundtrip() {
        let dir = TempDir::new().unwrap();
        let p = dir.path().join("session.json").display().to_string();
        let session = Session {
            files: vec!["/data/a.xlsx".to_string(), "/data/b.csv".to_string()],
            config: None,
        };
        write_session(&p, &session).unwrap();
        assert_eq!(read_session(&p).unwrap(), session);
    }
}
