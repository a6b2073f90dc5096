use config::ConfigError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScannerConfigError {
    // Error from config crate
    #[error("Error from the config crate")]
    Config(#[from] ConfigError),

    // Glob error
    #[error("Glob pattern error")]
    GlobPattern(#[from] glob::PatternError),

    // Missing configuration file passed explicitly
    #[error("Missing configuration file {file}")]
    MissingConfigFile { file: String },

    // Missing configuration file set in RPM_TRUST_CONFIG
    #[error("Missing file {file} set in 'RPM_TRUST_CONFIG' environment variable")]
    MissingEnvConfigFile { file: String },
}
