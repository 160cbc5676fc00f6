use config::{builder::DefaultState, Config as Cfg, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Settings shared by every process embedding the engine.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector endpoint; tracing is exported only when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_service_name() -> String {
    "crm-permission-engine".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Build the standard source stack: `.env`, an optional file, then
/// `<PREFIX>__SECTION__KEY` environment variables.
///
/// Without an explicit `file`, a `configuration.{toml,yaml,json}` in the
/// working directory is picked up when present. Keys in `list_keys` accept
/// comma-separated environment values.
pub fn layered_builder(
    prefix: &str,
    file: Option<&Path>,
    list_keys: &[&str],
) -> ConfigBuilder<DefaultState> {
    dotenvy::dotenv().ok();

    let builder = Cfg::builder();
    let builder = match file {
        Some(path) => builder.add_source(File::from(path).required(true)),
        None => builder.add_source(File::with_name("configuration").required(false)),
    };

    let mut environment = Environment::with_prefix(prefix)
        .separator("__")
        .list_separator(",")
        .try_parsing(true);
    for key in list_keys {
        environment = environment.with_list_parse_key(key);
    }

    builder.add_source(environment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_when_no_source_sets_them() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(file, "log_level = \"debug\"").unwrap();

        let config: Config = layered_builder("CORE_TEST", Some(file.path()), &[])
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.service_name, "crm-permission-engine");
        assert_eq!(config.log_level, "debug");
        assert!(config.otlp_endpoint.is_none());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let missing = Path::new("/nonexistent/crm.toml");
        let result = layered_builder("CORE_TEST", Some(missing), &[]).build();
        assert!(result.is_err());
    }
}
