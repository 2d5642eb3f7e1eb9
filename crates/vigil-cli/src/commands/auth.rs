use clap::Subcommand;
use vigil_core::store::session;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a platform session token in the OS keyring
    Login {
        /// Bearer token issued by the platform
        token: String,
    },
    /// Remove the stored session token
    Logout,
    /// Whether a session token is stored
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Login { token } => {
            session::set_token(&token)?;
            println!("token stored");
        }
        AuthAction::Logout => {
            session::clear_token()?;
            println!("token removed");
        }
        AuthAction::Status => match session::get_token()? {
            Some(_) => println!("authenticated"),
            None => println!("not authenticated"),
        },
    }
    Ok(())
}
