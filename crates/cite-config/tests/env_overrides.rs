use cite_config::{CacheBackendKind, ConfigError, ValidationConfig};
use figment::Jail;

#[test]
fn env_vars_fill_config_values() {
    Jail::expect_with(|jail| {
        jail.set_env("CITADEL_NETWORK__NCBI_API_KEY", "from-env");
        jail.set_env("CITADEL_CACHE__TTL_SECS", "60");
        jail.set_env("CITADEL_SOURCES__URL", "false");

        let config = ValidationConfig::load().expect("config loads");
        assert_eq!(config.network.ncbi_api_key, "from-env");
        assert_eq!(config.cache.ttl_secs, 60);
        assert!(!config.sources.url);
        Ok(())
    });
}

#[test]
fn env_beats_project_file() {
    Jail::expect_with(|jail| {
        jail.create_dir(".citadel")?;
        jail.create_file(
            ".citadel/config.toml",
            r#"
[cache]
backend = "document"
"#,
        )?;
        jail.set_env("CITADEL_CACHE__BACKEND", "relational");

        let config = ValidationConfig::load().expect("config loads");
        assert_eq!(config.cache.backend, CacheBackendKind::Relational);
        Ok(())
    });
}

#[test]
fn out_of_range_env_value_fails_validation() {
    Jail::expect_with(|jail| {
        jail.set_env("CITADEL_SCORING__SEARCH_ACCEPTANCE_THRESHOLD", "2.5");

        let config = ValidationConfig::load().expect("config loads");
        let err = config.validate().unwrap_err();
        match err {
            ConfigError::InvalidValue { field, .. } => {
                assert_eq!(field, "scoring.search_acceptance_threshold");
            }
            other => panic!("unexpected error: {other}"),
        }
        Ok(())
    });
}
