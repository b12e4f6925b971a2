use crate::adapters::sap_client::DEFAULT_SERVICE_PATH;
use crate::core::ConfigProvider;
use crate::utils::error::{Result, WorkerError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub worker: WorkerSection,
    pub api: ApiConfig,
    pub input: Option<InputConfig>,
    pub output: OutputConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSection {
    pub name: String,
    /// 未知的 Accepter 名稱是否讓訊息 Reject，預設為 true
    pub strict_accepter: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    #[serde(default = "default_service_path")]
    pub service_path: String,
    pub timeout_seconds: Option<u64>,
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputConfig {
    /// 訊息來源檔案；未設定或為 "-" 時讀取 stdin
    pub path: Option<String>,
    pub dead_letter_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub results_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub json: Option<bool>,
}

fn default_service_path() -> String {
    DEFAULT_SERVICE_PATH.to_string()
}

impl WorkerConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| WorkerError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| WorkerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SAP_API_BASE_URL})，未設定的變數保留原文
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| WorkerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("worker.name", &self.worker.name)?;

        validation::validate_no_placeholder("api.base_url", &self.api.base_url)?;
        validation::validate_url("api.base_url", &self.api.base_url)?;
        validation::validate_non_empty_string("api.service_path", &self.api.service_path)?;
        validation::validate_positive_number("api.timeout_seconds", self.timeout_seconds(), 1)?;

        validation::validate_path("output.results_path", &self.output.results_path)?;

        if let Some(input) = &self.input {
            if let Some(path) = &input.path {
                validation::validate_path("input.path", path)?;
            }
            if let Some(path) = &input.dead_letter_path {
                validation::validate_path("input.dead_letter_path", path)?;
            }
        }

        if let Some(level) = self.log_level() {
            if !VALID_LOG_LEVELS.contains(&level) {
                return Err(WorkerError::InvalidConfigValueError {
                    field: "logging.level".to_string(),
                    value: level.to_string(),
                    reason: format!("Valid levels: {}", VALID_LOG_LEVELS.join(", ")),
                });
            }
        }

        Ok(())
    }

    pub fn timeout_seconds(&self) -> u64 {
        self.api.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    /// 訊息來源；None 代表 stdin
    pub fn input_path(&self) -> Option<&str> {
        self.input
            .as_ref()
            .and_then(|i| i.path.as_deref())
            .filter(|p| *p != "-")
    }

    pub fn dead_letter_path(&self) -> Option<&str> {
        self.input.as_ref().and_then(|i| i.dead_letter_path.as_deref())
    }

    pub fn set_input_path(&mut self, path: String) {
        self.input.get_or_insert_with(InputConfig::default).path = Some(path);
    }

    pub fn log_level(&self) -> Option<&str> {
        self.logging.as_ref().and_then(|l| l.level.as_deref())
    }

    pub fn json_logs(&self) -> bool {
        self.logging.as_ref().and_then(|l| l.json).unwrap_or(false)
    }
}

impl ConfigProvider for WorkerConfig {
    fn api_base_url(&self) -> &str {
        &self.api.base_url
    }

    fn api_service_path(&self) -> &str {
        &self.api.service_path
    }

    fn request_timeout_seconds(&self) -> u64 {
        self.timeout_seconds()
    }

    fn request_headers(&self) -> &HashMap<String, String> {
        &self.api.headers
    }

    fn strict_accepter(&self) -> bool {
        self.worker.strict_accepter.unwrap_or(true)
    }
}

impl Validate for WorkerConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC: &str = r#"
[worker]
name = "product-master-reads"

[api]
base_url = "https://sandbox.example.com/sap/opu/odata/sap"
timeout_seconds = 10

[api.headers]
APIKey = "sandbox-key"

[output]
results_path = "./output/results.jsonl"
"#;

    #[test]
    fn test_parse_basic_worker_config() {
        let config = WorkerConfig::from_toml_str(BASIC).unwrap();

        assert_eq!(config.worker.name, "product-master-reads");
        assert_eq!(config.api_service_path(), "API_PRODUCT_SRV");
        assert_eq!(config.request_timeout_seconds(), 10);
        assert_eq!(
            config.request_headers().get("APIKey").map(String::as_str),
            Some("sandbox-key")
        );
        assert!(config.strict_accepter());
        assert_eq!(config.input_path(), None);
        assert!(!config.json_logs());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("PMW_TEST_BASE_URL", "https://s4.example.com/odata");

        let toml_content = r#"
[worker]
name = "test"
strict_accepter = false

[api]
base_url = "${PMW_TEST_BASE_URL}"

[input]
path = "-"

[output]
results_path = "./out.jsonl"
"#;

        let config = WorkerConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.api.base_url, "https://s4.example.com/odata");
        assert!(!config.strict_accepter());
        assert_eq!(config.input_path(), None);
        assert_eq!(config.timeout_seconds(), 30);

        std::env::remove_var("PMW_TEST_BASE_URL");
    }

    #[test]
    fn test_unresolved_placeholder_fails_validation() {
        let toml_content = BASIC.replace(
            "https://sandbox.example.com/sap/opu/odata/sap",
            "${PMW_TEST_UNSET_VARIABLE}",
        );
        let config = WorkerConfig::from_toml_str(&toml_content).unwrap();
        assert!(matches!(
            config.validate(),
            Err(WorkerError::MissingConfigError { .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        let invalid_url = BASIC.replace("https://sandbox.example.com/sap/opu/odata/sap", "not-a-url");
        assert!(WorkerConfig::from_toml_str(&invalid_url)
            .unwrap()
            .validate()
            .is_err());

        let zero_timeout = BASIC.replace("timeout_seconds = 10", "timeout_seconds = 0");
        assert!(WorkerConfig::from_toml_str(&zero_timeout)
            .unwrap()
            .validate()
            .is_err());

        let bad_level = format!("{}\n[logging]\nlevel = \"loud\"\n", BASIC);
        assert!(WorkerConfig::from_toml_str(&bad_level)
            .unwrap()
            .validate()
            .is_err());
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let result = WorkerConfig::from_toml_str("[worker]\nname = \"x\"\n");
        assert!(matches!(
            result,
            Err(WorkerError::ConfigValidationError { .. })
        ));
    }

    #[test]
    fn test_config_from_file_and_input_override() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC.as_bytes()).unwrap();

        let mut config = WorkerConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.worker.name, "product-master-reads");

        config.set_input_path("./messages.jsonl".to_string());
        assert_eq!(config.input_path(), Some("./messages.jsonl"));
    }
}
