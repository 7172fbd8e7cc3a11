mod header;
mod none;
mod traits;
mod types;

pub use header::*;
pub use none::*;
pub use traits::*;
pub use types::*;

use crate::config::AuthConfig;

/// Factory function to create authenticator from config
pub fn create_authenticator(config: &AuthConfig) -> Result<Box<dyn Authenticator>, AuthError> {
    use crate::config::AuthMethod;

    match config.method {
        AuthMethod::None => Ok(Box::new(NoneAuthenticator::new())),
        AuthMethod::Header => {
            if config.identity_header.trim().is_empty() {
                return Err(AuthError::ConfigurationError(
                    "identity_header must be set when using header auth method".to_string(),
                ));
            }
            Ok(Box::new(HeaderAuthenticator::new(
                config.identity_header.clone(),
            )))
        }
    }
}
