use serde::Deserialize;

/// Login form fields. Everything is optional so missing fields reach the
/// handler's validation instead of failing extraction.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub remember: Option<String>,
}

/// Signup form fields.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub confirm_password: Option<String>,
    pub terms: Option<String>,
}
