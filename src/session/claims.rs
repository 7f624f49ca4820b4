use serde::{Deserialize, Serialize};

/// Claims carried by the signed session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: i64,        // user ID
    pub name: String,    // denormalized display name
    pub email: String,   // denormalized email
    pub remember: bool,  // long-lived session requested at login
    pub iat: usize,      // issued at
    pub exp: usize,      // expiration time
    pub iss: String,     // issuer
}
