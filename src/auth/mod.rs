mod session;

pub use session::Session;

use crate::api::TokenIssuer;
use crate::core::{Result, ValidationError};

/// Exchange username/password for a token and log the session in with it.
///
/// On any failure the session, persisted token included, is left as it was.
pub async fn login_with_password(
    issuer: &dyn TokenIssuer,
    session: &Session,
    username: &str,
    password: &str,
) -> Result<()> {
    if username.trim().is_empty() || password.is_empty() {
        return Err(ValidationError::MissingCredentials.into());
    }

    let token = issuer.issue_token(username, password).await?;
    session.login(&token)
}
