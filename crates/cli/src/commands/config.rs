use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use cfpbot_core::config::{AppConfig, LoadOptions};
use secrecy::ExposeSecret;
use toml::Value;

struct Field {
    key: &'static str,
    env_keys: &'static [&'static str],
    value: String,
}

impl Field {
    fn new(key: &'static str, env_keys: &'static [&'static str], value: impl Into<String>) -> Self {
        Self { key, env_keys, value: value.into() }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in effective_fields(&config) {
        let source = field_source(
            field.key,
            field.env_keys,
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn effective_fields(config: &AppConfig) -> Vec<Field> {
    let oncall_users = if config.review.oncall_users.is_empty() {
        "<none>".to_string()
    } else {
        config.review.oncall_users.join(",")
    };
    let signing_secret = if config.slack.signing_secret.expose_secret().trim().is_empty() {
        "<empty>"
    } else {
        "<redacted>"
    };

    vec![
        Field::new("database.url", &["CFPBOT_DATABASE_URL"], config.database.url.clone()),
        Field::new(
            "database.max_connections",
            &["CFPBOT_DATABASE_MAX_CONNECTIONS"],
            config.database.max_connections.to_string(),
        ),
        Field::new(
            "database.timeout_secs",
            &["CFPBOT_DATABASE_TIMEOUT_SECS"],
            config.database.timeout_secs.to_string(),
        ),
        Field::new(
            "slack.bot_token",
            &["CFPBOT_SLACK_BOT_TOKEN"],
            redact_token(config.slack.bot_token.expose_secret()),
        ),
        Field::new("slack.signing_secret", &["CFPBOT_SLACK_SIGNING_SECRET"], signing_secret),
        Field::new(
            "slack.bot_user_id",
            &["CFPBOT_SLACK_BOT_USER_ID"],
            config.slack.bot_user_id.as_deref().unwrap_or("<unset>"),
        ),
        Field::new(
            "slack.status_channel",
            &["CFPBOT_SLACK_STATUS_CHANNEL"],
            config.slack.status_channel.clone(),
        ),
        Field::new("fortee.base_url", &["CFPBOT_FORTEE_BASE_URL"], config.fortee.base_url.clone()),
        Field::new(
            "fortee.timeout_secs",
            &["CFPBOT_FORTEE_TIMEOUT_SECS"],
            config.fortee.timeout_secs.to_string(),
        ),
        Field::new("review.oncall_users", &["CFPBOT_REVIEW_ONCALL_USERS"], oncall_users),
        Field::new(
            "schedule.new_proposals_interval_secs",
            &["CFPBOT_SCHEDULE_NEW_PROPOSALS_INTERVAL_SECS"],
            config.schedule.new_proposals_interval_secs.to_string(),
        ),
        Field::new(
            "schedule.status_digest_interval_secs",
            &["CFPBOT_SCHEDULE_STATUS_DIGEST_INTERVAL_SECS"],
            config.schedule.status_digest_interval_secs.to_string(),
        ),
        Field::new(
            "server.bind_address",
            &["CFPBOT_SERVER_BIND_ADDRESS"],
            config.server.bind_address.clone(),
        ),
        Field::new("server.port", &["CFPBOT_SERVER_PORT"], config.server.port.to_string()),
        Field::new(
            "server.graceful_shutdown_secs",
            &["CFPBOT_SERVER_GRACEFUL_SHUTDOWN_SECS"],
            config.server.graceful_shutdown_secs.to_string(),
        ),
        Field::new(
            "logging.level",
            &["CFPBOT_LOGGING_LEVEL", "CFPBOT_LOG_LEVEL"],
            config.logging.level.clone(),
        ),
        Field::new(
            "logging.format",
            &["CFPBOT_LOGGING_FORMAT", "CFPBOT_LOG_FORMAT"],
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    [PathBuf::from("cfpbot.toml"), PathBuf::from("config/cfpbot.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

fn redact_token(token: &str) -> String {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    if let Some((prefix, _)) = trimmed.split_once('-') {
        return format!("{prefix}-***");
    }

    "<redacted>".to_string()
}
