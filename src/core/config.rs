//! Webhook URL resolution from the environment

use super::error::{LoggerError, Result};

/// Environment variable holding the default webhook URL.
///
/// A comma separated list sends every record to each URL.
pub const WEBHOOK_URL_ENV: &str = "DISCORDLOGGER_WEBHOOK_URL";

/// Split a comma separated URL list, ignoring blank entries
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(String::from)
        .collect()
}

/// Read the webhook URLs from the environment
pub fn webhook_urls_from_env() -> Result<Vec<String>> {
    let raw = std::env::var(WEBHOOK_URL_ENV).unwrap_or_default();
    let urls = parse_url_list(&raw);
    if urls.is_empty() {
        return Err(LoggerError::MissingWebhookUrl {
            env_var: WEBHOOK_URL_ENV,
        });
    }
    Ok(urls)
}

/// Use the explicit URLs when given, the environment otherwise
pub fn resolve_webhook_urls(explicit: &[String]) -> Result<Vec<String>> {
    if explicit.is_empty() {
        return webhook_urls_from_env();
    }
    if let Some(blank) = explicit.iter().position(|url| url.trim().is_empty()) {
        return Err(LoggerError::config(
            "webhook_urls",
            format!("entry {} is empty", blank),
        ));
    }
    Ok(explicit.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_url_list() {
        assert_eq!(
            parse_url_list(" https://a.test/1 , ,https://b.test/2,"),
            vec!["https://a.test/1".to_string(), "https://b.test/2".to_string()]
        );
        assert!(parse_url_list("").is_empty());
    }

    #[test]
    fn test_explicit_urls_win() {
        let urls = resolve_webhook_urls(&["https://a.test/1".to_string()]).unwrap();
        assert_eq!(urls, vec!["https://a.test/1".to_string()]);
    }

    #[test]
    fn test_blank_explicit_url_is_rejected() {
        let err = resolve_webhook_urls(&["https://a.test/1".to_string(), " ".to_string()])
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
