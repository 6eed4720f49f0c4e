//! Configuration commands.
//!
//! - `config show`: Display current configuration
//! - `config get`: Print a single value
//! - `config set`: Set a value and save the file

use owo_colors::OwoColorize;
use serde_json::json;

use super::CommandOutput;
use crate::cli::OutputOptions;
use crate::config::Config;
use crate::error::Result;

/// Show the first 2 and last 2 characters of a secret
fn mask_sensitive_value(value: &str) -> String {
    let char_count = value.chars().count();
    if char_count > 4 {
        let first: String = value.chars().take(2).collect();
        let last: String = value.chars().skip(char_count - 2).collect();
        format!("{first}...{last}")
    } else {
        "****".to_string()
    }
}

/// Show current configuration, with environment overrides applied
pub fn cmd_config_show(output: OutputOptions) -> Result<()> {
    let config = Config::load()?;

    let api_url = config.api_url();
    let token = config.auth.token.as_deref().map(mask_sensitive_value);
    let token_configured = config.auth_token().is_some();

    let json_output = json!({
        "api_url": api_url,
        "auth": {
            "token_configured": token_configured,
        },
        "agent_id": config.agent_id,
        "poll_interval": config.poll_interval,
        "request_timeout": config.request_timeout,
        "dedup_window_ms": config.dedup_window_ms,
        "page_size": config.page_size,
        "config_file": Config::config_path().to_string_lossy(),
    });

    let mut text_output = String::new();
    text_output.push_str(&format!("{}\n\n", "Configuration:".cyan().bold()));

    let not_set = || "not configured".dimmed().to_string();
    text_output.push_str(&format!(
        "{}: {}\n",
        "api_url".cyan(),
        api_url.unwrap_or_else(not_set)
    ));
    text_output.push_str(&format!(
        "{}: {}\n",
        "auth.token".cyan(),
        match (token, token_configured) {
            (Some(masked), _) => masked.green().to_string(),
            (None, true) => "from environment".green().to_string(),
            (None, false) => not_set(),
        }
    ));
    text_output.push_str(&format!(
        "{}: {}\n",
        "agent_id".cyan(),
        config
            .agent_id
            .map(|id| id.to_string())
            .unwrap_or_else(not_set)
    ));

    text_output.push('\n');
    text_output.push_str(&format!("{}:\n", "polling".cyan()));
    text_output.push_str(&format!("  poll_interval: {}s\n", config.poll_interval));
    text_output.push_str(&format!("  request_timeout: {}s\n", config.request_timeout));
    text_output.push_str(&format!("  dedup_window_ms: {}\n", config.dedup_window_ms));
    text_output.push_str(&format!("  page_size: {}\n", config.page_size));

    text_output.push('\n');
    text_output.push_str(&format!(
        "{}",
        format!("Config file: {}", Config::config_path().display()).dimmed()
    ));

    CommandOutput::new(json_output)
        .with_text(text_output)
        .print(output)
}

/// Print one configuration value
pub fn cmd_config_get(key: &str, output: OutputOptions) -> Result<()> {
    let config = Config::load()?;
    let value = config.get_value(key)?;

    let json_output = json!({
        "key": key,
        "value": value,
    });
    let text = value.unwrap_or_else(|| "not set".dimmed().to_string());

    CommandOutput::new(json_output).with_text(text).print(output)
}

/// Set a configuration value and save
pub fn cmd_config_set(key: &str, value: &str, output: OutputOptions) -> Result<()> {
    let mut config = Config::load()?;
    config.set_value(key, value)?;
    config.save()?;

    let shown = if key == "auth.token" {
        mask_sensitive_value(value)
    } else {
        value.to_string()
    };

    let json_output = json!({
        "action": "config_set",
        "key": key,
        "value": shown,
        "success": true,
    });
    let text = format!("Set {} = {}", key.cyan(), shown);

    CommandOutput::new(json_output).with_text(text).print(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_sensitive_value() {
        assert_eq!(mask_sensitive_value("abcdefgh"), "ab...gh");
        assert_eq!(mask_sensitive_value("abcd"), "****");
        assert_eq!(mask_sensitive_value(""), "****");
    }
}
