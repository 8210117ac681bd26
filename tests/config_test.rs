use lectern::infrastructure::llm::create_generation_client;
use lectern::presentation::Environment;
use lectern::presentation::config::LlmSettings;

fn llm_settings(provider: &str, base_url: Option<&str>) -> LlmSettings {
    LlmSettings {
        provider: provider.to_string(),
        base_url: base_url.map(String::from),
        api_key: "test-key".to_string(),
        model: "test-model".to_string(),
        temperature: 0.8,
        request_timeout_secs: 30,
    }
}

#[test]
fn given_environment_names_when_parsing_then_accepts_known_values_case_insensitively() {
    assert_eq!(
        Environment::try_from("LOCAL".to_string()),
        Ok(Environment::Local)
    );
    assert_eq!(
        Environment::try_from("production".to_string()),
        Ok(Environment::Prod)
    );
    assert!(Environment::try_from("staging".to_string()).is_err());
}

#[test]
fn given_environment_when_naming_settings_file_then_uses_appsettings_prefix() {
    assert_eq!(Environment::Test.settings_file(), "appsettings.test");
}

#[test]
fn given_known_providers_when_creating_client_then_succeeds() {
    assert!(create_generation_client(&llm_settings("openai", None)).is_ok());
    assert!(create_generation_client(&llm_settings("groq", None)).is_ok());
    assert!(
        create_generation_client(&llm_settings("azure", Some("https://example.openai.azure.com")))
            .is_ok()
    );
}

#[test]
fn given_compatible_provider_without_base_url_when_creating_client_then_fails() {
    assert!(create_generation_client(&llm_settings("compatible", None)).is_err());
    assert!(
        create_generation_client(&llm_settings("compatible", Some("http://localhost:1234/v1/")))
            .is_ok()
    );
}

#[test]
fn given_unknown_provider_when_creating_client_then_fails() {
    assert!(create_generation_client(&llm_settings("carrier-pigeon", None)).is_err());
}
