use serde::Serialize;
use serde_json::json;
use vigil_core::store::session;
use vigil_core::{Config, CoreError, FanOutReport, HttpStore};

/// Build the platform client from the config's endpoint and the keyring
/// session token.
pub fn open_store(config: &Config) -> Result<HttpStore, CoreError> {
    let token = session::require_token()?;
    HttpStore::new(&config.account.platform_url, &token)
}

pub fn require_user_id(config: &Config) -> Result<String, CoreError> {
    if config.account.user_id.is_empty() {
        return Err(CoreError::Custom(
            "no account configured; run `vigil-cli config set account.user_id <id>`".into(),
        ));
    }
    Ok(config.account.user_id.clone())
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// JSON view of a fan-out report, with errors rendered as messages.
pub fn fan_out_json(report: &FanOutReport) -> serde_json::Value {
    json!({
        "attempted": report.attempted(),
        "succeeded": report.succeeded,
        "failed": report
            .failed
            .iter()
            .map(|f| json!({ "contactId": f.contact_id, "error": f.error.to_string() }))
            .collect::<Vec<_>>(),
    })
}
