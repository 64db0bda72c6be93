use std::{env, time::Duration};

use tracing::error;

use crate::utils::hash_string;

pub const DEFAULT_BREVO_API_BASE_URL: &str = "https://api.brevo.com";

pub fn get_host_uri() -> String {
    match env::var("HOST") {
        Ok(host) => format!("https://{host}"),
        _ => match env::var("FLY_APP_NAME") {
            Ok(host) => format!("https://{host}.fly.dev"),
            _ => {
                format!("http://localhost:{}", get_port())
            }
        },
    }
}

pub fn get_port() -> u16 {
    let default_port: u16 = 8080;

    let port = match env::var("PORT") {
        Ok(port) => port,
        _ => default_port.to_string(),
    };
    let port: u16 = match port.parse::<_>() {
        Ok(port) => port,
        _ => {
            error!("Failed to parse PORT env var, using default");
            default_port
        }
    };

    port
}

/// Path segment the admin pages are nested under, derived from `ADMIN_SEED`
pub fn get_admin_secret() -> String {
    let admin_seed = match env::var("ADMIN_SEED") {
        Ok(admin_seed) => admin_seed,
        _ => "defaultadminseed".to_string(),
    };

    hash_string(&admin_seed)[0..32].to_string()
}

/// Shared secret inbound webhooks must present, unset keeps the endpoint open
pub fn get_webhook_shared_secret() -> Option<String> {
    env::var("WEBHOOK_SHARED_SECRET")
        .ok()
        .filter(|secret| !secret.trim().is_empty())
}

pub fn get_db_path() -> String {
    env::var("DB_PATH").unwrap_or("givewp_brevo.db".to_string())
}

pub fn get_db_encryption_key() -> String {
    match env::var("DB_ENCRYPTION_KEY") {
        Ok(key) => key,
        _ => "defaultdbencryptionkey".to_string(),
    }
}

pub fn get_activity_log_path() -> String {
    env::var("ACTIVITY_LOG_PATH").unwrap_or("givewp-brevo.log".to_string())
}

pub fn get_activity_log_max_bytes() -> Option<u64> {
    let max_bytes = env::var("ACTIVITY_LOG_MAX_BYTES").ok()?;
    match max_bytes.parse::<u64>() {
        Ok(0) => None,
        Ok(max_bytes) => Some(max_bytes),
        _ => {
            error!("Failed to parse ACTIVITY_LOG_MAX_BYTES env var, log will not be rotated");
            None
        }
    }
}

pub fn get_brevo_api_base_url() -> String {
    match env::var("BREVO_API_BASE_URL") {
        Ok(url) => url.trim_end_matches('/').to_string(),
        _ => DEFAULT_BREVO_API_BASE_URL.to_string(),
    }
}

pub fn get_brevo_timeout() -> Option<Duration> {
    let timeout = env::var("BREVO_TIMEOUT").ok()?;
    match humantime::parse_duration(&timeout) {
        Ok(timeout) => Some(timeout),
        Err(e) => {
            error!("Failed to parse BREVO_TIMEOUT env var ({e}), no timeout will be set");
            None
        }
    }
}

pub fn get_brevo_strict_status() -> bool {
    match env::var("BREVO_STRICT_STATUS") {
        Ok(value) => matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"),
        _ => false,
    }
}

pub fn get_brevo_api_key() -> Option<String> {
    env::var("BREVO_API_KEY").ok()
}

pub fn get_brevo_list_id() -> Option<String> {
    env::var("BREVO_LIST_ID").ok()
}
