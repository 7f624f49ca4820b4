mod claims;
mod extract;
mod flash;
mod keys;

pub use claims::SessionClaims;
pub use extract::{AuthRedirect, Session};
pub use flash::{Flash, FLASH_COOKIE};
pub use keys::{SessionKeys, SESSION_COOKIE};
