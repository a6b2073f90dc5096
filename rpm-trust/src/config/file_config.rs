use crate::config::*;
use config::{
    builder::DefaultState, Config, ConfigBuilder, Environment, File,
    FileFormat,
};
use glob::glob;
use log::*;
use serde_derive::{Deserialize, Serialize};
use std::{
    env,
    path::{Path, PathBuf},
};

pub static GLOBAL_CONFIG_OVERRIDE_ENV_VAR: &str = "RPM_TRUST_CONFIG";

// Kinds of configuration file sources. A directory stands for all the files
// it contains, applied in lexical order.
#[derive(Debug)]
pub enum ConfigSource {
    File { path: PathBuf, required: bool },
    Directory(PathBuf),
}

// wrapper struct just to (de)serialize the [scanner] table
#[derive(Debug, Default, Deserialize, Serialize)]
struct FileConfig {
    #[serde(default)]
    scanner: ScannerConfig,
}

#[derive(Debug, Default)]
pub struct ScannerConfigBuilder {
    sources: Vec<ConfigSource>,
    environment: Option<Environment>,
    devel: Option<DevelEnvConfig>,
    explicit: bool,
}

impl ScannerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an optional configuration file.
    pub fn file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.sources.push(ConfigSource::File {
            path: path.into(),
            required: false,
        });
        self
    }

    /// Adds a configuration file that must exist.
    pub fn required_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.sources.push(ConfigSource::File {
            path: path.into(),
            required: true,
        });
        self
    }

    /// Adds a configuration file chosen by the user. It must exist and it
    /// takes precedence over the file set in 'RPM_TRUST_CONFIG'.
    pub fn explicit_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.explicit = true;
        self.required_file(path)
    }

    /// Adds all files within a directory as configuration sources.
    pub fn directory(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.sources.push(ConfigSource::Directory(path.into()));
        self
    }

    pub fn load_default_locations(&mut self) -> &mut Self {
        self.file(DEFAULT_CONFIG)
            .directory(DEFAULT_CONFIG_SNIPPETS_DIR)
    }

    /// Replace the process environment used for `RPM_TRUST_*` options.
    pub fn environment(&mut self, environment: Environment) -> &mut Self {
        self.environment = Some(environment);
        self
    }

    /// Replace the development override read from the process environment.
    pub fn devel(&mut self, devel: DevelEnvConfig) -> &mut Self {
        self.devel = Some(devel);
        self
    }

    pub fn build(&mut self) -> Result<ScannerConfig, ScannerConfigError> {
        let mut builder = Config::builder()
            .add_source(Config::try_from(&FileConfig::default())?);

        // If the 'RPM_TRUST_CONFIG' environment variable is set, load only the
        // configuration file set there, unless a file was given explicitly
        match env::var(GLOBAL_CONFIG_OVERRIDE_ENV_VAR) {
            Ok(env_cfg) if !env_cfg.is_empty() && self.explicit => {
                debug!(
                    "Explicit configuration file given, ignoring {}={}",
                    GLOBAL_CONFIG_OVERRIDE_ENV_VAR, env_cfg
                );
                builder = self.add_file_sources(builder)?;
            }
            Ok(env_cfg) if !env_cfg.is_empty() => {
                let path = Path::new(&env_cfg);
                if !path.exists() {
                    warn!(
                        "Configuration set in {} environment variable not found",
                        GLOBAL_CONFIG_OVERRIDE_ENV_VAR
                    );
                    return Err(ScannerConfigError::MissingEnvConfigFile {
                        file: path.display().to_string(),
                    });
                }
                warn!(
                    "Configuration replaced by {}: {}",
                    GLOBAL_CONFIG_OVERRIDE_ENV_VAR,
                    path.display()
                );
                builder = builder.add_source(
                    File::new(&env_cfg, FileFormat::Toml).required(true),
                );
            }
            _ => {
                builder = self.add_file_sources(builder)?;
            }
        }

        let environment = self
            .environment
            .take()
            .unwrap_or_else(scanner_environment);
        let devel = self.devel.take().unwrap_or_else(DevelEnvConfig::new);
        builder = builder.add_source(environment).add_source(devel);

        let f: FileConfig = builder.build()?.try_deserialize()?;
        debug!("Configuration build process finished: {:?}", f.scanner);
        Ok(f.scanner)
    }

    fn add_file_sources(
        &self,
        mut builder: ConfigBuilder<DefaultState>,
    ) -> Result<ConfigBuilder<DefaultState>, ScannerConfigError> {
        for (index, source) in self.sources.iter().enumerate() {
            match source {
                ConfigSource::File { path, required } => {
                    debug!(
                        "Loading configuration from FILE (#{}): {}",
                        index,
                        path.display()
                    );
                    builder = builder.add_source(
                        File::new(&path.display().to_string(), FileFormat::Toml)
                            .required(*required),
                    );
                }
                ConfigSource::Directory(path) => {
                    debug!(
                        "Loading configuration from DIRECTORY (#{}): {}",
                        index,
                        path.display()
                    );
                    builder = builder.add_source(
                        glob(&path.join("*").display().to_string())?
                            .filter_map(|entry| entry.ok())
                            .map(|path| {
                                File::new(
                                    &path.display().to_string(),
                                    FileFormat::Toml,
                                )
                                .required(false)
                            })
                            .collect::<Vec<_>>(),
                    );
                }
            }
        }
        Ok(builder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::Map;
    use std::io::Write;

    fn isolated() -> ScannerConfigBuilder {
        let mut builder = ScannerConfigBuilder::new();
        let _ = builder
            .environment(scanner_environment().source(Some(Map::new())))
            .devel(DevelEnvConfig::from_value(None));
        builder
    }

    #[test]
    fn test_defaults() {
        let config = isolated().build().expect("failed to build config");
        assert_eq!(config, ScannerConfig::default());
    }

    #[test]
    fn test_load_from_single_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let file_path = dir.path().join("scanner.conf");
        let mut file = std::fs::File::create(&file_path)
            .expect("failed to create config file");
        writeln!(
            file,
            "[scanner]\nsource_version = \"8.10\"\ntarget_version = \"9.4\""
        )
        .expect("failed to write on config file");

        let config = isolated()
            .file(&file_path)
            .build()
            .expect("failed to build configuration");

        assert_eq!(config.source_version.as_deref(), Some("8.10"));
        assert_eq!(config.target_version.as_deref(), Some("9.4"));
        assert_eq!(
            config.resolve_upgrade_path().unwrap(), //#[allow_ci]
            Some("8to9".to_string())
        );
    }

    #[test]
    fn test_load_from_directory() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let mut file1 = std::fs::File::create(dir.path().join("00-base.conf"))
            .expect("failed to create config file");
        writeln!(file1, "[scanner]\nupgrade_path = \"7to8\"\ncloud_map = \"/a\"")
            .expect("failed to write on config file");

        let mut file2 =
            std::fs::File::create(dir.path().join("10-override.conf"))
                .expect("failed to create config file");
        writeln!(file2, "[scanner]\nupgrade_path = \"8to9\"")
            .expect("failed to write on config file");

        let config = isolated()
            .directory(dir.path())
            .build()
            .expect("failed to build config");

        assert_eq!(config.upgrade_path.as_deref(), Some("8to9"));
        assert_eq!(config.cloud_map.as_deref(), Some("/a"));
    }

    #[test]
    fn test_missing_optional_sources() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let config = isolated()
            .file(dir.path().join("missing.conf"))
            .directory(dir.path().join("missing.d"))
            .build()
            .expect("failed to build config");
        assert_eq!(config, ScannerConfig::default());
    }

    #[test]
    fn test_missing_required_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let r = isolated()
            .required_file(dir.path().join("missing.conf"))
            .build();
        assert!(matches!(r, Err(ScannerConfigError::Config(_))));
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = tempfile::tempdir().expect("failed to create tempdir");
        let file_path = dir.path().join("scanner.conf");
        let mut file = std::fs::File::create(&file_path)
            .expect("failed to create config file");
        writeln!(file, "[scanner]\nupgrade_path = \"7to8\"\nall_signed = true")
            .expect("failed to write on config file");

        let config = isolated()
            .file(&file_path)
            .environment(scanner_environment().source(Some(Map::from([(
                "RPM_TRUST_SCANNER__UPGRADE_PATH".to_string(),
                "8to9".to_string(),
            )]))))
            .devel(DevelEnvConfig::from_value(Some("0")))
            .build()
            .expect("failed to build config");

        assert_eq!(config.upgrade_path.as_deref(), Some("8to9"));
        assert!(!config.all_signed);
    }
}
