use clap::Parser;
use std::path::PathBuf;
use todobot_core::config::ConfigOverrides;

/// Console chat transport for the todo bot.
///
/// Every stdin line is one chat message. A line starting with `@name` is
/// sent by user `name` in chat `name`.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Default sender of each line
    #[arg(long, value_name = "USER", default_value = "local")]
    pub user: String,

    /// Default chat replies go to (defaults to the user)
    #[arg(long, value_name = "CHAT")]
    pub chat: Option<String>,

    /// Read configuration from this file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE")]
    pub config_override: Vec<String>,

    /// Keep running after end of input until every reminder has fired
    #[arg(long)]
    pub wait: bool,
}

impl Cli {
    pub fn default_chat(&self) -> &str {
        self.chat.as_deref().unwrap_or(&self.user)
    }

    pub fn overrides(&self) -> Result<ConfigOverrides, String> {
        let mut overrides = ConfigOverrides::default();
        for raw in &self.config_override {
            parse_config_override(raw)?.apply(&mut overrides);
        }
        Ok(overrides)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Prefix,
    PreserveCase,
    UtcOffset,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

impl ParsedConfigOverride {
    fn apply(self, overrides: &mut ConfigOverrides) {
        match self.target {
            ConfigOverrideTarget::Prefix => overrides.command_prefix = Some(self.value),
            ConfigOverrideTarget::PreserveCase => {
                overrides.preserve_case = Some(self.value == "true")
            }
            ConfigOverrideTarget::UtcOffset => overrides.utc_offset = Some(self.value),
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(self.value),
        }
    }
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let canonical_field =
        canonicalize_flag_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match canonical_field.as_str() {
        "prefix" | "command_prefix" => ConfigOverrideTarget::Prefix,
        "preserve_case" => ConfigOverrideTarget::PreserveCase,
        "utc_offset" | "offset" => ConfigOverrideTarget::UtcOffset,
        "log_level" => ConfigOverrideTarget::LogLevel,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if target == ConfigOverrideTarget::PreserveCase {
        let normalized = value.to_ascii_lowercase();
        return match normalized.as_str() {
            "true" | "false" => Ok(ParsedConfigOverride {
                target,
                value: normalized,
            }),
            _ => Err(format!("preserve_case must be true or false, got '{value}'")),
        };
    }

    Ok(ParsedConfigOverride { target, value })
}

fn canonicalize_flag_name(name: &str) -> Option<String> {
    let mut cleaned = String::new();
    let mut previous_underscore = false;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            cleaned.push(ch.to_ascii_lowercase());
            previous_underscore = false;
        } else if !previous_underscore && !cleaned.is_empty() {
            cleaned.push('_');
            previous_underscore = true;
        }
    }

    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
