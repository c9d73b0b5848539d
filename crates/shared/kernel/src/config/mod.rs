use config::{Config, Environment, File};
use sbox_domain::constants::{DEFAULT_CONFIG_FILE, ENV_PREFIX, PORT_ENV};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Custom error type for config loading.
#[sbox_derive::sbox_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
    #[error("Invalid port{}: {message}", format_context(.context))]
    InvalidPort { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
}

/// Layered configuration loader over the process environment.
///
/// 1. **Base File**: `path` if given (must exist), otherwise an optional `shutterbox.toml`
///    in the working directory.
/// 2. **Environment Overrides**: variables prefixed with `SBOX__`, nested with double
///    underscores (`SBOX__STORAGE__PICTURES_DIR` maps to `storage.pictures_dir`).
/// 3. **Port**: a plain `PORT` variable wins over everything for `server.port`.
///
/// # Errors
/// * An explicitly requested file is missing or malformed.
/// * The merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use sbox_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    load_config_with_env(path, std::env::vars().collect())
}

/// Same as [`load_config`] with an explicit variable map instead of the process environment.
pub fn load_config_with_env<T>(
    path: Option<impl AsRef<Path>>,
    vars: HashMap<String, String>,
) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let required = path.is_some();
    let effective_path =
        path.map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), |p| p.as_ref().to_path_buf());
    let port = vars
        .get(PORT_ENV)
        .map(|raw| {
            raw.trim().parse::<u16>().map(i64::from).map_err(|e| ConfigError::InvalidPort {
                message: raw.clone().into(),
                context: Some(e.to_string().into()),
            })
        })
        .transpose()?;

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(required))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true)
                .source(Some(vars.into_iter().collect())),
        )
        .set_override_option("server.port", port)
        .context("Invalid PORT override")?;

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sbox_domain::config::AppConfig;
    use std::path::PathBuf;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect()
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let cfg: AppConfig = load_config_with_env(None::<&str>, HashMap::new()).unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.storage.pictures_dir, PathBuf::from("pictures"));
    }

    #[test]
    fn plain_port_variable_is_honored() {
        let cfg: AppConfig = load_config_with_env(None::<&str>, vars(&[("PORT", "9090")])).unwrap();
        assert_eq!(cfg.server.port, 9090);
    }

    #[test]
    fn prefixed_variables_override_nested_keys() {
        let cfg: AppConfig = load_config_with_env(
            None::<&str>,
            vars(&[("SBOX__STORAGE__PICTURES_DIR", "/srv/pics"), ("SBOX__SERVER__PORT", "7000")]),
        )
        .unwrap();
        assert_eq!(cfg.storage.pictures_dir, PathBuf::from("/srv/pics"));
        assert_eq!(cfg.server.port, 7000);
    }

    #[test]
    fn file_values_are_loaded_and_port_env_wins() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("custom.toml");
        std::fs::write(
            &file,
            "[server]\nport = 6000\n\n[upload]\nmax_file_size = 2048\nallowed_extensions = [\"png\"]\n",
        )
        .unwrap();

        let cfg: AppConfig = load_config_with_env(Some(&file), HashMap::new()).unwrap();
        assert_eq!(cfg.server.port, 6000);
        assert_eq!(cfg.upload.max_file_size, 2048);
        assert!(!cfg.upload.allows_extension("jpg"));

        let cfg: AppConfig = load_config_with_env(Some(&file), vars(&[("PORT", "6001")])).unwrap();
        assert_eq!(cfg.server.port, 6001);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let res: Result<AppConfig, _> =
            load_config_with_env(Some("/definitely/missing/config.toml"), HashMap::new());
        assert!(matches!(res, Err(ConfigError::Config { .. })));
    }

    #[test]
    fn malformed_port_is_an_error() {
        let res: Result<AppConfig, _> = load_config_with_env(None::<&str>, vars(&[("PORT", "eighty")]));
        assert!(matches!(res, Err(ConfigError::InvalidPort { .. })));
    }
}
