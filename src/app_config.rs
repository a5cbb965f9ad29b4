//! Application configuration loading and CLI override merging.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use locshare_core::endpoints::{DEFAULT_ACCOUNTS_URL, DEFAULT_MAPS_URL};
use locshare_core::{DEFAULT_DEADLINE, DriverOptions, Endpoints, OutputFormat};

use crate::cli::Args;

/// File configuration for run defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    /// Watchdog deadline in seconds (same range as CLI).
    pub timeout_secs: Option<u64>,
    /// Default verbosity mode.
    pub verbosity: Option<VerbositySetting>,
    /// Log out after reading locations.
    pub logout: Option<bool>,
    /// Emit JSON lines instead of text lines.
    pub json: Option<bool>,
    /// Accounts base URL override.
    pub accounts_url: Option<String>,
    /// Maps base URL override.
    pub maps_url: Option<String>,
}

impl FileConfig {
    /// Validates config values against CLI constraints.
    pub fn validate(&self) -> Result<()> {
        if let Some(timeout) = self.timeout_secs
            && !(1..=3600).contains(&timeout)
        {
            bail!("Invalid config value for `timeout_secs`: {timeout}. Expected range: 1..=3600");
        }
        validate_base_url("accounts_url", self.accounts_url.as_deref())?;
        validate_base_url("maps_url", self.maps_url.as_deref())?;
        Ok(())
    }
}

fn validate_base_url(field: &str, value: Option<&str>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    let parsed = url::Url::parse(value)
        .with_context(|| format!("Invalid config value for `{field}`: '{value}'"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("Invalid config value for `{field}`: '{value}'. Expected an http(s) URL");
    }
    Ok(())
}

/// Supported config verbosity labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerbositySetting {
    Default,
    Verbose,
    Quiet,
    Debug,
}

impl VerbositySetting {
    /// Returns the stable string label for display output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Verbose => "verbose",
            Self::Quiet => "quiet",
            Self::Debug => "debug",
        }
    }

    /// Tracing filter directive for this setting.
    #[must_use]
    pub fn filter_level(self) -> &'static str {
        match self {
            Self::Default => "info",
            Self::Verbose => "debug",
            Self::Quiet => "error",
            Self::Debug => "trace",
        }
    }
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/locshare/config.toml`
/// 2. `$HOME/.config/locshare/config.toml`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("locshare")
                .join("config.toml"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("locshare")
            .join("config.toml"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from default path if present.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let config = match path.as_deref() {
        Some(path_ref) if path_ref.exists() => Some(load_file_config(path_ref)?),
        _ => None,
    };
    Ok(LoadedConfig { path, config })
}

/// Reads and validates a config file.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    parse_config_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

fn parse_config_str(raw: &str) -> Result<FileConfig> {
    let mut cfg = FileConfig::default();
    for (line_index, raw_line) in raw.lines().enumerate() {
        let line = strip_inline_comment(raw_line).trim();
        if line.is_empty() {
            continue;
        }
        let line_no = line_index + 1;

        let Some((raw_key, raw_value)) = line.split_once('=') else {
            bail!("Invalid config syntax on line {line_no}: expected key = value");
        };

        let key = raw_key.trim();
        let value = raw_value.trim();

        match key {
            "timeout_secs" => {
                let parsed = parse_integer_u64(value)
                    .with_context(|| format!("Invalid `timeout_secs` value on line {line_no}"))?;
                cfg.timeout_secs = Some(parsed);
            }
            "verbosity" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `verbosity` value on line {line_no}"))?;
                cfg.verbosity = Some(parse_verbosity(&parsed).with_context(|| {
                    format!("Invalid `verbosity` value '{parsed}' on line {line_no}")
                })?);
            }
            "logout" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `logout` value on line {line_no}"))?;
                cfg.logout = Some(parsed);
            }
            "json" => {
                let parsed = parse_boolean(value)
                    .with_context(|| format!("Invalid `json` value on line {line_no}"))?;
                cfg.json = Some(parsed);
            }
            "accounts_url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `accounts_url` value on line {line_no}"))?;
                cfg.accounts_url = Some(parsed);
            }
            "maps_url" => {
                let parsed = parse_string_literal(value)
                    .with_context(|| format!("Invalid `maps_url` value on line {line_no}"))?;
                cfg.maps_url = Some(parsed);
            }
            unknown => {
                bail!("Unknown configuration key: '{unknown}' on line {line_no}");
            }
        }
    }
    cfg.validate()?;
    Ok(cfg)
}

fn strip_inline_comment(line: &str) -> &str {
    let mut in_string = false;
    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_string_literal(raw_value: &str) -> Result<String> {
    if raw_value.len() < 2 || !raw_value.starts_with('"') || !raw_value.ends_with('"') {
        bail!("Expected double-quoted string");
    }
    Ok(raw_value[1..raw_value.len() - 1].to_string())
}

fn parse_integer_u64(raw_value: &str) -> Result<u64> {
    let token = raw_value.trim();
    if token.is_empty() {
        bail!("Expected integer value");
    }
    token
        .parse::<u64>()
        .with_context(|| format!("Expected non-negative integer, got `{token}`"))
}

fn parse_verbosity(value: &str) -> Result<VerbositySetting> {
    match value {
        "default" => Ok(VerbositySetting::Default),
        "verbose" => Ok(VerbositySetting::Verbose),
        "quiet" => Ok(VerbositySetting::Quiet),
        "debug" => Ok(VerbositySetting::Debug),
        _ => bail!("Expected one of: default, verbose, quiet, debug"),
    }
}

fn parse_boolean(raw_value: &str) -> Result<bool> {
    match raw_value.trim() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => bail!("Expected 'true' or 'false'"),
    }
}

/// Effective run settings after merging file config and CLI flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    pub deadline: Duration,
    /// Default tracing level, used when `RUST_LOG` is unset.
    pub log_level: &'static str,
    pub driver: DriverOptions,
    pub accounts_url: Option<String>,
    pub maps_url: Option<String>,
}

impl RunSettings {
    /// Merges settings; command-line flags win over file values.
    #[must_use]
    pub fn resolve(args: &Args, file: Option<&FileConfig>) -> Self {
        let file = file.cloned().unwrap_or_default();

        let log_level = if args.quiet {
            "error"
        } else {
            match args.verbose {
                0 => file
                    .verbosity
                    .unwrap_or(VerbositySetting::Default)
                    .filter_level(),
                1 => "debug",
                _ => "trace",
            }
        };

        let deadline = args
            .timeout
            .or(file.timeout_secs)
            .map_or(DEFAULT_DEADLINE, Duration::from_secs);

        let json = args.json || file.json.unwrap_or(false);
        let driver = DriverOptions {
            logout: args.logout || file.logout.unwrap_or(false),
            format: if json {
                OutputFormat::JsonLines
            } else {
                OutputFormat::Text
            },
        };

        Self {
            deadline,
            log_level,
            driver,
            accounts_url: args.accounts_url.clone().or(file.accounts_url),
            maps_url: args.maps_url.clone().or(file.maps_url),
        }
    }

    /// Endpoints with any base URL overrides applied.
    #[must_use]
    pub fn endpoints(&self) -> Endpoints {
        Endpoints::with_base_urls(
            self.accounts_url.as_deref().unwrap_or(DEFAULT_ACCOUNTS_URL),
            self.maps_url.as_deref().unwrap_or(DEFAULT_MAPS_URL),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use clap::Parser;

    use super::*;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["locshare", "me@example.com", "pw"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_parse_config_partial_fields() {
        let cfg = parse_config_str(
            r#"
timeout_secs = 30
verbosity = "verbose"
"#,
        )
        .expect("partial config should parse");
        assert_eq!(cfg.timeout_secs, Some(30));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Verbose));
        assert!(cfg.logout.is_none());
        assert!(cfg.accounts_url.is_none());
    }

    #[test]
    fn test_parse_config_all_fields() {
        let cfg = parse_config_str(
            r#"
timeout_secs = 90
verbosity = "quiet"
logout = true
json = false
accounts_url = "http://127.0.0.1:8080"
maps_url = "https://maps.example"
"#,
        )
        .expect("full config should parse");
        assert_eq!(cfg.timeout_secs, Some(90));
        assert_eq!(cfg.verbosity, Some(VerbositySetting::Quiet));
        assert_eq!(cfg.logout, Some(true));
        assert_eq!(cfg.json, Some(false));
        assert_eq!(cfg.accounts_url.as_deref(), Some("http://127.0.0.1:8080"));
        assert_eq!(cfg.maps_url.as_deref(), Some("https://maps.example"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_timeout() {
        let err = parse_config_str("timeout_secs = 0").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("timeout_secs"));

        let err = parse_config_str("timeout_secs = 3601").expect_err("invalid timeout expected");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_numeric_values_with_trailing_tokens() {
        let err =
            parse_config_str("timeout_secs = 4 trailing").expect_err("expected trailing token error");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_parse_config_rejects_negative_and_oversized_timeout() {
        let err = parse_config_str("timeout_secs = -5").expect_err("negative timeout rejected");
        assert!(err.to_string().contains("timeout_secs"));
        assert!(format!("{err:#}").contains("`-5`"), "got: {err:#}");

        let err = parse_config_str("timeout_secs = 18446744073709551616")
            .expect_err("timeout beyond u64 rejected");
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_parse_config_supports_inline_comments() {
        let cfg = parse_config_str(
            r#"
# run defaults
timeout_secs = 45 # seconds
maps_url = "https://maps.example/#frag" # hash inside string is kept
"#,
        )
        .expect("config with comments should parse");
        assert_eq!(cfg.timeout_secs, Some(45));
        assert_eq!(cfg.maps_url.as_deref(), Some("https://maps.example/#frag"));
    }

    #[test]
    fn test_parse_config_rejects_invalid_boolean() {
        let err = parse_config_str("logout = yes").expect_err("invalid boolean expected");
        assert!(err.to_string().contains("logout"));
    }

    #[test]
    fn test_parse_config_rejects_unquoted_url() {
        let err = parse_config_str("accounts_url = http://x").expect_err("quoted string expected");
        assert!(err.to_string().contains("accounts_url"));
    }

    #[test]
    fn test_parse_config_rejects_non_http_url() {
        let err = parse_config_str(r#"maps_url = "ftp://maps.example""#)
            .expect_err("http url expected");
        assert!(err.to_string().contains("maps_url"));
    }

    #[test]
    fn test_parse_config_rejects_unknown_keys() {
        let err = parse_config_str("unknown_key = 123").expect_err("unknown key error expected");
        assert!(err.to_string().contains("Unknown configuration key"));
        assert!(err.to_string().contains("unknown_key"));
    }

    #[test]
    fn test_parse_config_rejects_missing_equals() {
        let err = parse_config_str("logout").expect_err("syntax error expected");
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_verbosity_as_str() {
        assert_eq!(VerbositySetting::Default.as_str(), "default");
        assert_eq!(VerbositySetting::Verbose.as_str(), "verbose");
        assert_eq!(VerbositySetting::Quiet.as_str(), "quiet");
        assert_eq!(VerbositySetting::Debug.as_str(), "debug");
    }

    #[test]
    fn test_load_file_config_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = 12\njson = true").unwrap();

        let cfg = load_file_config(file.path()).expect("config file should load");
        assert_eq!(cfg.timeout_secs, Some(12));
        assert_eq!(cfg.json, Some(true));
    }

    #[test]
    fn test_load_file_config_error_names_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "timeout_secs = nope").unwrap();

        let err = load_file_config(file.path()).expect_err("invalid config expected");
        assert!(err.to_string().contains(&file.path().display().to_string()));
    }

    #[test]
    fn test_resolve_defaults_without_file() {
        let settings = RunSettings::resolve(&args(&[]), None);
        assert_eq!(settings.deadline, DEFAULT_DEADLINE);
        assert_eq!(settings.log_level, "info");
        assert_eq!(settings.driver, DriverOptions::default());
        assert_eq!(settings.endpoints(), Endpoints::default());
    }

    #[test]
    fn test_resolve_file_values_apply() {
        let file = FileConfig {
            timeout_secs: Some(15),
            verbosity: Some(VerbositySetting::Debug),
            logout: Some(true),
            json: Some(true),
            accounts_url: Some("http://127.0.0.1:1".to_string()),
            maps_url: None,
        };
        let settings = RunSettings::resolve(&args(&[]), Some(&file));
        assert_eq!(settings.deadline, Duration::from_secs(15));
        assert_eq!(settings.log_level, "trace");
        assert!(settings.driver.logout);
        assert_eq!(settings.driver.format, OutputFormat::JsonLines);
        assert_eq!(settings.endpoints().accounts_base(), "http://127.0.0.1:1");
    }

    #[test]
    fn test_resolve_cli_overrides_file() {
        let file = FileConfig {
            timeout_secs: Some(15),
            verbosity: Some(VerbositySetting::Debug),
            accounts_url: Some("http://127.0.0.1:1".to_string()),
            ..FileConfig::default()
        };
        let settings = RunSettings::resolve(
            &args(&["-q", "-t", "3", "--accounts-url", "http://127.0.0.1:2"]),
            Some(&file),
        );
        assert_eq!(settings.deadline, Duration::from_secs(3));
        assert_eq!(settings.log_level, "error");
        assert_eq!(settings.endpoints().accounts_base(), "http://127.0.0.1:2");
    }

    #[test]
    fn test_resolve_verbose_count_levels() {
        assert_eq!(RunSettings::resolve(&args(&["-v"]), None).log_level, "debug");
        assert_eq!(RunSettings::resolve(&args(&["-vv"]), None).log_level, "trace");
    }
}
