use laiser::config::AppConfig;
use laiser::llm::Provider;
use serial_test::serial;
use std::env;
use std::io::Write;

// Helper to clear environment variables that might interfere with tests
fn clear_env_vars() {
    unsafe {
        env::remove_var("LAISER_SERVER__PORT");
        env::remove_var("LAISER_OLLAMA__MODEL");
        env::remove_var("LAISER_BACKEND__API");
        env::remove_var("CONFIG_FILE");
        env::remove_var("PORT");
    }
}

/// INI file holding `contents`, removed when dropped.
fn ini_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".ini")
        .tempfile()
        .expect("Failed to create temp config");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temp config");
    file
}

#[test]
#[serial]
fn test_default_config() {
    clear_env_vars();
    let empty = ini_file("");

    let (cli, config) = AppConfig::load_from_args([
        "laiser",
        "--server",
        "--config",
        empty.path().to_str().unwrap(),
    ])
    .expect("Failed to load config");

    assert!(cli.server);
    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 5000);
    assert_eq!(config.backend.api, Provider::Ollama);
    assert_eq!(config.llama_cpp.n_predict, 128);
    assert_eq!(config.ollama.model, "llama3");
    assert_eq!(config.search.result_count, 5);
    assert_eq!(config.wikipedia_trim(), Some(5));
    assert!(!config.status.silent);
    assert_eq!(
        config.request_timeout(),
        Some(std::time::Duration::from_secs(300))
    );
}

#[test]
#[serial]
fn test_env_override() {
    clear_env_vars();
    let empty = ini_file("");
    unsafe {
        env::set_var("LAISER_SERVER__PORT", "9090");
        env::set_var("LAISER_OLLAMA__MODEL", "mistral");
    }

    let (_, config) = AppConfig::load_from_args([
        "laiser",
        "-s",
        "-c",
        empty.path().to_str().unwrap(),
    ])
    .expect("Failed to load config");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.llm_settings().ollama_model, "mistral");

    clear_env_vars();
}

#[test]
#[serial]
fn test_file_load() {
    clear_env_vars();
    let file = ini_file(
        "[server]\nport = 7070\n\n\
         [backend]\napi = llama.cpp\n\n\
         [llama_cpp]\nhost = 10.0.0.2\nport = 8181\n\n\
         [search]\ntrim_wikipedia_summary = false\nquery_delay_ms = 0\n",
    );

    // Tell AppConfig to use this file via Env Var
    unsafe {
        env::set_var("CONFIG_FILE", file.path());
    }

    let (_, config) =
        AppConfig::load_from_args(["laiser", "-q", "rust"]).expect("Failed to load config file");
    assert_eq!(config.server.port, 7070);
    assert_eq!(config.backend.api, Provider::LlamaCpp);
    assert_eq!(config.llm_settings().llama_cpp_url, "http://10.0.0.2:8181");
    assert_eq!(config.wikipedia_trim(), None);
    assert!(config.research_settings().query_delay.is_zero());

    clear_env_vars();
}

#[test]
#[serial]
fn test_cli_beats_env_and_file() {
    clear_env_vars();
    let file = ini_file("[server]\nport = 7070\nhost = 0.0.0.0\n");
    unsafe {
        env::set_var("LAISER_SERVER__PORT", "9090");
    }

    let (_, config) = AppConfig::load_from_args([
        "laiser",
        "--server",
        "--config",
        file.path().to_str().unwrap(),
        "--port",
        "6060",
        "--host",
        "127.0.0.2",
    ])
    .expect("Failed to load config");
    assert_eq!(config.bind_address(), "127.0.0.2:6060");

    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();
    let result = AppConfig::load_from_args([
        "laiser",
        "--server",
        "--config",
        "/nonexistent/laiser-settings.ini",
    ]);
    assert!(result.is_err());
}

#[test]
#[serial]
fn test_mode_flag_is_required() {
    clear_env_vars();
    assert!(AppConfig::load_from_args(["laiser"]).is_err());
}
