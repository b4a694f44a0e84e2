use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_INPUT: &str = "Government-Secondary.pdf";
pub const DEFAULT_OUTPUT: &str = "uganda_schools_dataset.json";
pub const DEFAULT_DATASET_KEY: &str = "uganda";
pub const DEFAULT_DESCRIPTION: &str = "This dataset contains information about all Government Secondary Schools in Uganda, organized by district. The data includes school names and their corresponding EMIS (Education Management Information System) codes, which are unique identifiers for educational institutions in Uganda.";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input_path: String,
    pub output_path: String,
    pub dataset_key: String,
    pub description: String,
    // Flattened district/name/emis export, disabled unless set
    pub csv_output: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: DEFAULT_INPUT.to_string(),
            output_path: DEFAULT_OUTPUT.to_string(),
            dataset_key: DEFAULT_DATASET_KEY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            csv_output: None,
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.dataset_key.trim().is_empty() {
            anyhow::bail!("dataset_key must not be empty");
        }
        if self.input_path.trim().is_empty() {
            anyhow::bail!("input_path must not be empty");
        }
        if self.output_path.trim().is_empty() {
            anyhow::bail!("output_path must not be empty");
        }
        Ok(())
    }
}

/// One school as it appears in the output dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolRecord {
    pub name: String,
    /// EMIS code, empty when the source row had none.
    pub emis: String,
}

/// Fields recovered from a single data row of the listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLine {
    pub name: String,
    pub district: String,
    pub code: String,
}

impl ParsedLine {
    pub fn has_code(&self) -> bool {
        !self.code.is_empty()
    }

    pub fn into_record(self) -> (String, SchoolRecord) {
        (
            self.district,
            SchoolRecord {
                name: self.name,
                emis: self.code,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetBody {
    pub description: String,
    // Kept as a string to match the published dataset format
    pub total_districts: String,
    pub districts: BTreeMap<String, Vec<SchoolRecord>>,
}

/// The finished dataset. Serializes as a single-key object whose key is
/// `key`, e.g. `{"uganda": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    pub key: String,
    pub body: DatasetBody,
}

impl Dataset {
    pub fn total_schools(&self) -> usize {
        self.body.districts.values().map(Vec::len).sum()
    }

    pub fn district_names(&self) -> impl Iterator<Item = &str> {
        self.body.districts.keys().map(String::as_str)
    }

    /// Pretty JSON with 4-space indentation; non-ASCII text is left unescaped.
    pub fn to_json(&self) -> serde_json::Result<String> {
        let mut document = BTreeMap::new();
        document.insert(self.key.as_str(), &self.body);

        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        document.serialize(&mut serializer)?;

        // serde_json only ever writes valid UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    #[cfg(test)]
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let document: BTreeMap<String, DatasetBody> = serde_json::from_str(json)?;
        if document.len() != 1 {
            anyhow::bail!(
                "expected exactly one dataset key at the top level, found {}",
                document.len()
            );
        }
        let (key, body) = document
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("dataset document is empty"))?;
        Ok(Self { key, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> Dataset {
        let mut districts = BTreeMap::new();
        districts.insert(
            "Gulu".to_string(),
            vec![SchoolRecord {
                name: "Sir Samuel Baker SS".to_string(),
                emis: "".to_string(),
            }],
        );
        districts.insert(
            "Wakiso".to_string(),
            vec![
                SchoolRecord {
                    name: "Kings College Budo".to_string(),
                    emis: "123456".to_string(),
                },
                SchoolRecord {
                    name: "Mpererwe Église SS".to_string(),
                    emis: "998877".to_string(),
                },
            ],
        );
        Dataset {
            key: "uganda".to_string(),
            body: DatasetBody {
                description: "test".to_string(),
                total_districts: "2".to_string(),
                districts,
            },
        }
    }

    #[test]
    fn json_has_expected_shape() {
        let json = sample_dataset().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        let body = &value["uganda"];
        assert_eq!(body["description"], "test");
        assert_eq!(body["total_districts"], "2");
        assert_eq!(body["districts"]["Gulu"][0]["emis"], "");
        assert_eq!(body["districts"]["Wakiso"][1]["emis"], "998877");
    }

    #[test]
    fn json_uses_four_space_indent_and_keeps_unicode() {
        let json = sample_dataset().to_json().unwrap();
        assert!(json.starts_with("{\n    \"uganda\": {\n        \"description\""));
        assert!(json.contains("Mpererwe Église SS"));
        assert!(!json.contains("\\u00c9"));
    }

    #[test]
    fn body_fields_keep_declaration_order() {
        let json = sample_dataset().to_json().unwrap();
        let description = json.find("\"description\"").unwrap();
        let total = json.find("\"total_districts\"").unwrap();
        let districts = json.find("\"districts\"").unwrap();
        assert!(description < total && total < districts);
    }

    #[test]
    fn reparsing_output_gives_same_dataset() {
        let dataset = sample_dataset();
        let parsed = Dataset::from_json(&dataset.to_json().unwrap()).unwrap();
        assert_eq!(parsed, dataset);
        assert_eq!(parsed.total_schools(), 3);
    }

    #[test]
    fn from_json_rejects_multiple_roots() {
        let json = r#"{
            "a": {"description": "", "total_districts": "0", "districts": {}},
            "b": {"description": "", "total_districts": "0", "districts": {}}
        }"#;
        assert!(Dataset::from_json(json).is_err());
    }

    #[test]
    fn config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extractor.toml");
        let path = path.to_str().unwrap();

        let config = Config {
            csv_output: Some("schools.csv".to_string()),
            ..Config::default()
        };
        config.save_to_file(path).unwrap();
        assert_eq!(Config::load_from_file(path).unwrap(), config);
    }

    #[test]
    fn empty_dataset_key_is_invalid() {
        let config = Config {
            dataset_key: " ".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
        assert!(Config::default().validate().is_ok());
    }
}
