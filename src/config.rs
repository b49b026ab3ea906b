use std::path::PathBuf;

use crate::submission::defaults::DefaultsProfile;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub log_level: String,
    pub export_file: PathBuf,
    pub sheet_name: String,
    pub ledger_key: String,
    pub defaults_profile: DefaultsProfile,
    pub defaults_file: Option<PathBuf>,
    pub import: ImportConfig,
}

/// Limits applied by the file picker before an import is attempted.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    pub accept: String,
    pub max_size_mb: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database_url: "sqlite://intake.db".to_string(),
            log_level: "info".to_string(),
            export_file: PathBuf::from("data-innovation-app.xlsx"),
            sheet_name: "Form Submissions".to_string(),
            ledger_key: "accumulatedFormData".to_string(),
            defaults_profile: DefaultsProfile::Standard,
            defaults_file: None,
            import: ImportConfig {
                accept: ".xlsx".to_string(),
                max_size_mb: 10,
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from `lookup`, which returns the raw value of a variable
    /// when it is set. Invalid values name the variable in the error.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = env_or("INTAKE_DATABASE_URL", &defaults.database_url);
        let log_level = env_or("INTAKE_LOG_LEVEL", &defaults.log_level);

        let export_file = lookup("INTAKE_EXPORT_FILE")
            .map(PathBuf::from)
            .unwrap_or(defaults.export_file);

        let sheet_name = env_or("INTAKE_SHEET_NAME", &defaults.sheet_name);
        if sheet_name.trim().is_empty() {
            return Err("Invalid INTAKE_SHEET_NAME: must not be empty".to_string());
        }

        let ledger_key = env_or("INTAKE_LEDGER_KEY", &defaults.ledger_key);

        let defaults_profile: DefaultsProfile = env_or("INTAKE_DEFAULTS", "standard")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_DEFAULTS: {e}"))?;

        let defaults_file = lookup("INTAKE_DEFAULTS_FILE")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let max_size_mb: u64 = env_or("INTAKE_MAX_IMPORT_MB", "10")
            .parse()
            .map_err(|e| format!("Invalid INTAKE_MAX_IMPORT_MB: {e}"))?;

        let accept = env_or("INTAKE_IMPORT_ACCEPT", &defaults.import.accept);

        Ok(Config {
            database_url,
            log_level,
            export_file,
            sheet_name,
            ledger_key,
            defaults_profile,
            defaults_file,
            import: ImportConfig {
                accept,
                max_size_mb,
            },
        })
    }
}
