use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use vigil_core::{AlertService, Config, Database, DocumentStore, ManualAlertState};

use super::common;

/// Local cache key for the optimistic alert snapshot.
const ALERT_STATE_KEY: &str = "alert_state";

#[derive(Subcommand)]
pub enum AlertAction {
    /// Trigger the manual emergency alert
    Trigger,
    /// Clear the manual emergency alert
    Clear,
    /// Print the remote alert state as JSON
    Status,
}

pub fn run(action: AlertAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let user_id = common::require_user_id(&config)?;
    let store = common::open_store(&config)?;
    let now = Utc::now();

    match action {
        AlertAction::Trigger => {
            let mut optimistic = ManualAlertState::default();
            optimistic.trigger(now);
            run_with_optimistic_cache(&optimistic, || {
                AlertService::new(&store).trigger(&user_id, now)
            })?;
        }
        AlertAction::Clear => {
            run_with_optimistic_cache(&ManualAlertState::default(), || {
                AlertService::new(&store).clear(&user_id, now)
            })?;
        }
        AlertAction::Status => {
            let record = store.get_user_record(&user_id)?;
            common::print_json(&record.alert)?;
        }
    }
    Ok(())
}

/// Flip the locally cached alert state before the remote write, and put
/// the previous snapshot back if the primary write fails. Mirror fan-out
/// failures do not revert anything; they are reported in the output.
fn run_with_optimistic_cache(
    optimistic: &ManualAlertState,
    op: impl FnOnce() -> Result<vigil_core::AlertUpdate, vigil_core::CoreError>,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;
    let previous = db.kv_get(ALERT_STATE_KEY)?;
    db.kv_set(ALERT_STATE_KEY, &serde_json::to_string(optimistic)?)?;

    match op() {
        Ok(update) => {
            common::print_json(&json!({
                "event": update.event,
                "fanOut": common::fan_out_json(&update.fan_out),
            }))?;
            Ok(())
        }
        Err(e) => {
            match previous {
                Some(snapshot) => db.kv_set(ALERT_STATE_KEY, &snapshot)?,
                None => db.kv_delete(ALERT_STATE_KEY)?,
            }
            Err(e.into())
        }
    }
}
