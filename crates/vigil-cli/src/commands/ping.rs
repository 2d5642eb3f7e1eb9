use chrono::Utc;
use clap::Subcommand;
use serde_json::json;
use vigil_core::{Config, DocumentStore, PingService};

use super::common;

#[derive(Subcommand)]
pub enum PingAction {
    /// Ask a contact to check in or respond
    Send {
        /// Contact user id
        contact: String,
    },
    /// Retract a ping you sent without waiting for a response
    Retract {
        /// Contact user id
        contact: String,
    },
    /// Respond to a ping from one contact
    Respond {
        /// Contact user id
        contact: String,
    },
    /// Respond to every incoming ping
    RespondAll,
    /// List ping state across all contacts
    List,
}

pub fn run(action: PingAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let user_id = common::require_user_id(&config)?;
    let store = common::open_store(&config)?;
    let service = PingService::new(&store);
    let now = Utc::now();

    match action {
        PingAction::Send { contact } => {
            let event = service.ping(&user_id, &contact, now)?;
            common::print_json(&event)?;
        }
        PingAction::Retract { contact } => {
            let event = service.retract(&user_id, &contact, now)?;
            common::print_json(&event)?;
        }
        PingAction::Respond { contact } => {
            let event = service.respond(&user_id, &contact, now)?;
            common::print_json(&event)?;
        }
        PingAction::RespondAll => {
            let (events, report) = service.respond_to_all(&user_id, now)?;
            common::print_json(&json!({
                "events": events,
                "fanOut": common::fan_out_json(&report),
            }))?;
        }
        PingAction::List => {
            let contacts = store.list_contacts(&user_id)?;
            let rows: Vec<_> = contacts
                .iter()
                .map(|c| {
                    json!({
                        "contactId": c.contact_id,
                        "name": c.name,
                        "hasOutgoingPing": c.has_outgoing_ping,
                        "outgoingPingTimestamp": c.outgoing_ping_at,
                        "hasIncomingPing": c.has_incoming_ping,
                        "incomingPingTimestamp": c.incoming_ping_at,
                    })
                })
                .collect();
            common::print_json(&rows)?;
        }
    }
    Ok(())
}
