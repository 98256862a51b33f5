// tests/config_load.rs
use dashboard_aggregator::config::aggregator::{ENV_CACHE_TTL_SECS, ENV_CONFIG_PATH};
use dashboard_aggregator::{AggregatorConfig, Source};
use std::{env, fs};

const TOML: &str = r#"
[[sources]]
name = "ip"
url = "https://api.ipify.org/?format=json"

[[sources]]
name = "quote"
url = "http://localhost:9000/quote"
"#;

#[test]
fn load_from_toml_and_json_paths() {
    let dir = tempfile::tempdir().unwrap();

    let p_toml = dir.path().join("aggregator.toml");
    fs::write(&p_toml, TOML).unwrap();
    let t = AggregatorConfig::load_from(&p_toml).unwrap();
    assert_eq!(t.sources.len(), 2);
    assert_eq!(t.cache_ttl_secs, 60);

    let p_json = dir.path().join("aggregator.json");
    fs::write(
        &p_json,
        r#"{"sources":[{"name":"ip","url":"http://x/ip"}],"cache_ttl_secs":5}"#,
    )
    .unwrap();
    let j = AggregatorConfig::load_from(&p_json).unwrap();
    assert_eq!(j.sources, vec![Source::new("ip", "http://x/ip")]);
    assert_eq!(j.cache_ttl_secs, 5);
}

#[test]
fn load_from_rejects_blank_url() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("bad.json");
    fs::write(&p, r#"{"sources":[{"name":"ip","url":""}]}"#).unwrap();
    assert!(AggregatorConfig::load_from(&p).is_err());
}

#[test]
fn load_from_rejects_zero_ttl() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("zero.toml");
    fs::write(&p, format!("cache_ttl_secs = 0\n{TOML}")).unwrap();
    assert!(AggregatorConfig::load_from(&p).is_err());
}

#[serial_test::serial]
#[test]
fn default_uses_env_then_fallbacks() {
    // Isolate CWD so the repo's own config/ is never read.
    let old = env::current_dir().unwrap();
    let tmp = tempfile::tempdir().unwrap();
    env::set_current_dir(tmp.path()).unwrap();
    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_CACHE_TTL_SECS);

    // 1) Nothing anywhere -> error
    assert!(AggregatorConfig::load_default().is_err());

    // 2) Fallback TOML in ./config/
    let cfg_dir = tmp.path().join("config");
    fs::create_dir_all(&cfg_dir).unwrap();
    fs::write(cfg_dir.join("aggregator.toml"), TOML).unwrap();
    let t = AggregatorConfig::load_default().unwrap();
    assert_eq!(t.sources.len(), 2);

    // 3) Env path wins
    let p_env = tmp.path().join("other.json");
    fs::write(&p_env, r#"{"sources":[{"name":"only","url":"http://o"}]}"#).unwrap();
    env::set_var(ENV_CONFIG_PATH, p_env.display().to_string());
    let e = AggregatorConfig::load_default().unwrap();
    assert_eq!(e.sources, vec![Source::new("only", "http://o")]);

    // 4) TTL override
    env::set_var(ENV_CACHE_TTL_SECS, "300");
    let o = AggregatorConfig::load_default().unwrap();
    assert_eq!(o.cache_ttl_secs, 300);

    // 5) Env path to nowhere is an error, not a silent fallback
    env::set_var(ENV_CONFIG_PATH, tmp.path().join("missing.toml").display().to_string());
    assert!(AggregatorConfig::load_default().is_err());

    env::remove_var(ENV_CONFIG_PATH);
    env::remove_var(ENV_CACHE_TTL_SECS);
    env::set_current_dir(&old).unwrap();
}
