use std::time::Duration;

use clap::{ArgGroup, Parser};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::llm::{LlmSettings, Provider, ResearchSettings};

const DEFAULT_CONFIG_FILE: &str = "settings.ini";

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("mode").required(true).args(["query", "server"])))]
pub struct Cli {
    /// Answer one question in the terminal
    #[arg(short, long)]
    pub query: Option<String>,

    /// Serve the chat page
    #[arg(short, long)]
    pub server: bool,

    /// Config file path
    #[arg(short, long, env = "CONFIG_FILE")]
    pub config: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    pub port: Option<u16>,

    /// Address to bind
    #[arg(long)]
    pub host: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub llama_cpp: LlamaCppConfig,
    pub ollama: OllamaConfig,
    pub status: StatusConfig,
    pub search: SearchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub timeout_secs: u64,
    pub timeout_disabled: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    pub api: Provider,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlamaCppConfig {
    pub host: String,
    pub port: u16,
    pub n_predict: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OllamaConfig {
    pub base_url: String,
    pub generate_url: String,
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatusConfig {
    /// Suppress progress output and lower the log level to `warn`.
    pub silent: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    pub result_count: usize,
    pub news_result_count: usize,
    pub trim_wikipedia_summary: bool,
    pub trim_wikipedia_lines: usize,
    pub query_delay_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub json: bool,
}

impl AppConfig {
    pub fn load_from_args<I, T>(args: I) -> Result<(Cli, Self), config::ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let cli =
            Cli::try_parse_from(args).map_err(|e| config::ConfigError::Message(e.to_string()))?;
        let config = Self::from_cli(&cli)?;
        Ok((cli, config))
    }

    /// Layer defaults, the INI file, `LAISER_*` variables and CLI flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("server.timeout_secs", 300)?
            .set_default("server.timeout_disabled", false)?
            .set_default("backend.api", "ollama")?
            .set_default("llama_cpp.host", "127.0.0.1")?
            .set_default("llama_cpp.port", 8080)?
            .set_default("llama_cpp.n_predict", 128)?
            .set_default("ollama.base_url", "http://127.0.0.1:11434")?
            .set_default("ollama.generate_url", "http://127.0.0.1:11434/api/generate")?
            .set_default("ollama.model", "llama3")?
            .set_default("status.silent", false)?
            .set_default("search.result_count", 5)?
            .set_default("search.news_result_count", 5)?
            .set_default("search.trim_wikipedia_summary", true)?
            .set_default("search.trim_wikipedia_lines", 5)?
            .set_default("search.query_delay_ms", 200)?
            .set_default("logging.json", false)?;

        // A missing default file is fine; a missing explicit one is not.
        let (path, required) = match &cli.config {
            Some(path) => (path.as_str(), true),
            None => (DEFAULT_CONFIG_FILE, false),
        };
        builder = builder
            .add_source(File::new(path, FileFormat::Ini).required(required))
            .add_source(
                Environment::with_prefix("LAISER")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        if let Some(port) = cli.port {
            builder = builder.set_override("server.port", port)?;
        }
        if let Some(host) = &cli.host {
            builder = builder.set_override("server.host", host.as_str())?;
        }

        builder.build()?.try_deserialize()
    }

    /// Backend connection settings.
    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            provider: self.backend.api,
            llama_cpp_url: format!("http://{}:{}", self.llama_cpp.host, self.llama_cpp.port),
            n_predict: self.llama_cpp.n_predict,
            ollama_base_url: self.ollama.base_url.clone(),
            ollama_generate_url: self.ollama.generate_url.clone(),
            ollama_model: self.ollama.model.clone(),
        }
    }

    /// Result counts and pacing.
    pub fn research_settings(&self) -> ResearchSettings {
        ResearchSettings {
            result_count: self.search.result_count,
            news_result_count: self.search.news_result_count,
            query_delay: Duration::from_millis(self.search.query_delay_ms),
        }
    }

    /// Sentence cap for Wikipedia summaries, if trimming is on.
    pub fn wikipedia_trim(&self) -> Option<usize> {
        self.search
            .trim_wikipedia_summary
            .then_some(self.search.trim_wikipedia_lines)
    }

    /// Request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (!self.server.timeout_disabled).then(|| Duration::from_secs(self.server.timeout_secs))
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_mode_is_required() {
        assert!(Cli::try_parse_from(["laiser"]).is_err());
        assert!(Cli::try_parse_from(["laiser", "-s", "-q", "rust"]).is_err());
        assert!(parse(&["laiser", "-s"]).server);
        assert_eq!(parse(&["laiser", "-q", "rust"]).query.as_deref(), Some("rust"));
    }

    #[test]
    fn test_derived_settings() {
        let empty = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        let cli = Cli {
            query: None,
            server: true,
            config: Some(empty.path().to_string_lossy().into_owned()),
            port: None,
            host: None,
        };
        let mut config = AppConfig::from_cli(&cli).unwrap();
        assert_eq!(
            config.research_settings().query_delay,
            Duration::from_millis(200)
        );

        config.llama_cpp.port = 8081;
        config.search.trim_wikipedia_summary = false;
        config.server.timeout_disabled = true;

        assert_eq!(config.llm_settings().llama_cpp_url, "http://127.0.0.1:8081");
        assert_eq!(config.wikipedia_trim(), None);
        assert_eq!(config.request_timeout(), None);
    }
}
