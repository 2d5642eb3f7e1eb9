use chrono::Utc;
use clap::Subcommand;
use vigil_core::store::Directory;
use vigil_core::{Config, ContactService};

use super::common;

#[derive(Subcommand)]
pub enum ContactsAction {
    /// Accept a scanned QR invite code
    Add {
        /// Opaque invite code from the scanned QR
        code: String,
        /// The contact is notified of your overdue/alert state
        #[arg(long)]
        responder: bool,
        /// You monitor the contact's state
        #[arg(long)]
        dependent: bool,
    },
    /// Overwrite both role flags for a contact
    Roles {
        /// Contact user id
        contact: String,
        #[arg(long)]
        responder: bool,
        #[arg(long)]
        dependent: bool,
    },
    /// Remove your record of a contact (theirs is unaffected)
    Remove {
        /// Contact user id
        contact: String,
    },
    /// List all contacts as JSON
    List,
    /// Resolve a scanned QR code without adding the contact
    Lookup {
        /// Opaque invite code from the scanned QR
        code: String,
    },
    /// Dependents that are overdue or alerting, with the badge count
    Watchlist,
}

pub fn run(action: ContactsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let user_id = common::require_user_id(&config)?;
    let store = common::open_store(&config)?;
    let service = ContactService::new(&store);
    let now = Utc::now();

    match action {
        ContactsAction::Add {
            code,
            responder,
            dependent,
        } => {
            let event = service.accept_invite(&store, &user_id, &code, responder, dependent, now)?;
            common::print_json(&event)?;
        }
        ContactsAction::Roles {
            contact,
            responder,
            dependent,
        } => {
            let event = service.toggle_roles(&user_id, &contact, responder, dependent, now)?;
            common::print_json(&event)?;
        }
        ContactsAction::Remove { contact } => {
            let event = service.remove_contact(&user_id, &contact, now)?;
            common::print_json(&event)?;
        }
        ContactsAction::List => {
            common::print_json(&service.list(&user_id)?)?;
        }
        ContactsAction::Lookup { code } => {
            let details = store.lookup_invite(&code)?;
            common::print_json(&details)?;
        }
        ContactsAction::Watchlist => {
            let watchlist = service.watchlist(&user_id, now)?;
            common::print_json(&serde_json::json!({
                "nonResponsiveCount": watchlist.non_responsive_count(),
                "entries": watchlist.entries,
            }))?;
        }
    }
    Ok(())
}
