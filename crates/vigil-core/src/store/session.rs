//! Platform session token, stored in the OS keyring.

use crate::error::SessionError;

const SERVICE: &str = "vigil";
const TOKEN_KEY: &str = "platform_token";

pub fn get_token() -> Result<Option<String>, SessionError> {
    let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
    match entry.get_password() {
        Ok(token) => Ok(Some(token)),
        Err(keyring::Error::NoEntry) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn set_token(token: &str) -> Result<(), SessionError> {
    let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
    entry.set_password(token)?;
    Ok(())
}

pub fn clear_token() -> Result<(), SessionError> {
    let entry = keyring::Entry::new(SERVICE, TOKEN_KEY)?;
    match entry.delete_credential() {
        Ok(()) => Ok(()),
        Err(keyring::Error::NoEntry) => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Token required for store construction; absent token is an error the
/// caller can surface as "run auth login".
pub fn require_token() -> Result<String, SessionError> {
    get_token()?.ok_or(SessionError::NoToken)
}
