use std::env;
use std::path::{Path, PathBuf};

use crate::config::{ConfigError, ResolveConfig, SettingsFile};

pub const CONFIG_FILE_NAME: &str = "apkgraph.toml";
pub const CONFIG_ENV: &str = "APKGRAPH_CONFIG";

/// Finds the config file to use, if any.
///
/// An explicit path wins, then `APKGRAPH_CONFIG`, then the nearest
/// `apkgraph.toml` above `start`. Explicit and env paths must exist.
pub fn locate_config(
    start: impl AsRef<Path>,
    explicit: Option<PathBuf>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        return existing(path).map(Some);
    }

    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.trim().is_empty() {
            return existing(PathBuf::from(path)).map(Some);
        }
    }

    Ok(find_config_from(start.as_ref()))
}

pub fn load_settings(path: &Path) -> Result<SettingsFile, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
    }

    let contents = std::fs::read_to_string(path)?;
    toml::from_str(&contents).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Loads the located config file (if any), applies `overrides` and validates.
pub fn load_resolve_config(
    start: impl AsRef<Path>,
    explicit: Option<PathBuf>,
    overrides: SettingsFile,
) -> Result<ResolveConfig, ConfigError> {
    let file = match locate_config(start, explicit)? {
        Some(path) => load_settings(&path)?,
        None => SettingsFile::default(),
    };
    file.merge(overrides).finalize()
}

fn existing(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(ConfigError::ConfigNotFound(path))
    }
}

fn find_config_from(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .map(|ancestor| ancestor.join(CONFIG_FILE_NAME))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::time::{SystemTime, UNIX_EPOCH};

    use crate::config::resolve::{load_resolve_config, load_settings, locate_config};
    use crate::config::{ConfigError, RepoMode, SettingsFile};

    fn unique_temp_dir(prefix: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before epoch")
            .as_nanos();
        let pid = std::process::id();
        std::env::temp_dir().join(format!("apkgraph-{prefix}-{pid}-{nanos}"))
    }

    #[test]
    fn finds_config_in_ancestor_directory() {
        let root = unique_temp_dir("config-ancestor");
        let nested = root.join("a").join("b");
        fs::create_dir_all(&nested).expect("create nested dir");
        fs::write(
            root.join("apkgraph.toml"),
            "package_name = \"A\"\nrepository_url = \"graph.txt\"\nrepo_mode = \"test\"\n",
        )
        .expect("write config");

        let found = locate_config(&nested, None)
            .expect("locate")
            .expect("config path");
        assert_eq!(found, root.join("apkgraph.toml"));

        let config =
            load_resolve_config(&nested, Some(found), SettingsFile::default()).expect("load");
        assert_eq!(config.package_name, "A");
        assert_eq!(config.repo_mode, RepoMode::Test);

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let root = unique_temp_dir("config-missing");
        let err = locate_config(&root, Some(root.join("nope.toml"))).expect_err("missing");
        assert!(matches!(err, ConfigError::ConfigNotFound(_)));
    }

    #[test]
    fn invalid_repo_mode_is_a_parse_error() {
        let root = unique_temp_dir("config-invalid");
        fs::create_dir_all(&root).expect("create dir");
        let path = root.join("apkgraph.toml");
        fs::write(
            &path,
            "package_name = \"A\"\nrepository_url = \"x\"\nrepo_mode = \"staging\"\n",
        )
        .expect("write config");

        let err = load_settings(&path).expect_err("invalid mode");
        assert!(matches!(err, ConfigError::Toml { .. }));

        let _ = fs::remove_dir_all(root);
    }

    #[test]
    fn reads_transport_table() {
        let root = unique_temp_dir("config-transport");
        fs::create_dir_all(&root).expect("create dir");
        let path = root.join("apkgraph.toml");
        fs::write(
            &path,
            r#"package_name = "busybox"
repository_url = "https://mirror.example/alpine/v3.19/main"
repo_mode = "prod"
package_version = "1.36"
ascii_output = true
format = "json"

[transport]
timeout_secs = 12
accept_invalid_certs = true
"#,
        )
        .expect("write config");

        let config = load_settings(&path)
            .expect("load")
            .finalize()
            .expect("finalize");
        assert!(config.ascii_output);
        assert_eq!(config.transport.timeout.as_secs(), 12);
        assert!(config.transport.accept_invalid_certs);
        assert_eq!(config.package_version.as_deref(), Some("1.36"));

        let _ = fs::remove_dir_all(root);
    }
}
