use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn config_file_persistence() {
    let temp_dir = TempDir::new().expect("should create TempDir successfully");
    let config_path = temp_dir.path().join("config.toml");

    let original_config = Config {
        ollama: OllamaConfig {
            protocol: "https".to_string(),
            host: "test-host".to_string(),
            port: 8080,
            model: "test-model".to_string(),
            batch_size: 32,
            embedding_dimension: 384,
        },
        llm: LlmConfig {
            enabled: false,
            ..LlmConfig::default()
        },
        ..Config::default()
    };

    let toml_content = toml::to_string_pretty(&original_config)
        .expect("config should convert to toml string successfully");
    fs::write(&config_path, toml_content).expect("should write to config_path successfully");

    let content =
        fs::read_to_string(&config_path).expect("should read from config_path successfully");
    let loaded_config: Config = toml::from_str(&content).expect("should parse toml correctly");

    assert_eq!(original_config, loaded_config);
}

#[test]
fn invalid_toml_handling() {
    let invalid_toml = r#"
        [ollama
        host = "localhost"
        port = "invalid_port"
    "#;

    let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
    assert!(result.is_err());
}

#[test]
fn wrong_value_type_is_rejected() {
    let invalid_toml = r#"
        [ollama]
        port = "invalid_port"
    "#;

    let result: Result<Config, toml::de::Error> = toml::from_str(invalid_toml);
    assert!(result.is_err());
}

#[test]
fn unknown_provider_is_rejected() {
    let result: Result<Config, toml::de::Error> =
        toml::from_str("embedding_provider = \"cohere\"\n");
    assert!(result.is_err());
}

#[test]
fn complete_valid_config() {
    let valid_toml = r#"
        embedding_provider = "openai"
        knowledge_file = "kb/fakultet.txt"

        [ollama]
        protocol = "http"
        host = "localhost"
        port = 11434
        model = "nomic-embed-text:latest"
        batch_size = 64
        embedding_dimension = 768

        [openai_embeddings]
        endpoint = "https://api.openai.com/v1"
        model = "text-embedding-3-small"
        api_key_env = "OPEN_API_KEY_OPENAI"
        batch_size = 100
        embedding_dimension = 1536

        [chunking]
        max_chunk_size = 800

        [retrieval]
        top_k = 5
        keyword_max_results = 10
        tfidf_max_results = 4
        tfidf_min_score = 0.05
        min_score = 0.2
        dedupe_context = true

        [llm]
        enabled = true
        endpoint = "https://models.inference.ai.azure.com"
        model = "Mistral-small"
        api_key_env = "GITHUB_TOKEN"
        temperature = 0.3
        max_tokens = 800
        timeout_seconds = 20
    "#;

    let config: Config = toml::from_str(valid_toml).expect("should parse toml successfully");
    assert!(config.validate().is_ok());
    assert_eq!(config.embedding_provider, EmbeddingProvider::OpenAi);
    assert_eq!(config.embedding_model(), "text-embedding-3-small");
    assert_eq!(config.openai_embeddings.api_key_env, "OPEN_API_KEY_OPENAI");
    assert_eq!(config.chunking.max_chunk_size, 800);
    assert_eq!(config.retrieval.min_score, Some(0.2));
    assert!(config.retrieval.dedupe_context);
    assert_eq!(config.llm.timeout_seconds, 20);
}

#[test]
fn ollama_url_generation_with_different_hosts() {
    let configs = vec![
        ("http", "localhost", 11434, "http://localhost:11434/"),
        ("http", "127.0.0.1", 8080, "http://127.0.0.1:8080/"),
        (
            "https",
            "secure.example.com",
            443,
            "https://secure.example.com/",
        ),
    ];

    for (protocol, host, port, expected_url) in configs {
        let ollama = OllamaConfig {
            protocol: protocol.to_string(),
            host: host.to_string(),
            port,
            ..OllamaConfig::default()
        };

        let url = ollama.ollama_url().expect("ollama_url is ok");
        assert_eq!(url.as_str(), expected_url);
    }
}

#[test]
fn empty_host_is_invalid() {
    let config = Config {
        ollama: OllamaConfig {
            host: String::new(),
            ..OllamaConfig::default()
        },
        ..Config::default()
    };

    assert!(config.validate().is_err());
}

#[test]
fn error_display_messages() {
    let errors = vec![
        ConfigError::InvalidProtocol("ftp".to_string()),
        ConfigError::InvalidPort(0),
        ConfigError::InvalidBatchSize(0),
        ConfigError::InvalidModel(String::new()),
        ConfigError::InvalidUrl("invalid-url".to_string()),
        ConfigError::InvalidTimeout(0),
        ConfigError::InvalidResultCount {
            name: "top_k",
            value: 0,
            max: 50,
        },
    ];

    for error in errors {
        let message = format!("{error}");
        assert!(message.len() > 10);
    }
}
