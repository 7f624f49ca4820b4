use axum_extra::extract::cookie::{Cookie, CookieJar};

pub const FLASH_COOKIE: &str = "quizzy_flash";

/// One-shot notice surfaced on the next rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    LoginRequired,
    LoggedOut,
    LoginSuccess,
    SignupSuccess,
}

impl Flash {
    fn code(self) -> &'static str {
        match self {
            Flash::LoginRequired => "login-required",
            Flash::LoggedOut => "logged-out",
            Flash::LoginSuccess => "login-success",
            Flash::SignupSuccess => "signup-success",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "login-required" => Some(Flash::LoginRequired),
            "logged-out" => Some(Flash::LoggedOut),
            "login-success" => Some(Flash::LoginSuccess),
            "signup-success" => Some(Flash::SignupSuccess),
            _ => None,
        }
    }

    pub fn level(self) -> &'static str {
        match self {
            Flash::LoginRequired => "warning",
            _ => "success",
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Flash::LoginRequired => "Please log in to access this page.",
            Flash::LoggedOut => "You have been logged out.",
            Flash::LoginSuccess => "Login successful!",
            Flash::SignupSuccess => "Account created successfully!",
        }
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build((FLASH_COOKIE, self.code()))
            .path("/")
            .http_only(true)
            .build()
    }

    /// Read and clear the pending flash, if any.
    pub fn take(jar: CookieJar) -> (CookieJar, Option<Flash>) {
        let flash = jar.get(FLASH_COOKIE).and_then(|c| Flash::from_code(c.value()));
        if jar.get(FLASH_COOKIE).is_some() {
            let jar = jar.remove(Cookie::build((FLASH_COOKIE, "")).path("/").build());
            (jar, flash)
        } else {
            (jar, None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_roundtrip() {
        for flash in [
            Flash::LoginRequired,
            Flash::LoggedOut,
            Flash::LoginSuccess,
            Flash::SignupSuccess,
        ] {
            assert_eq!(Flash::from_code(flash.code()), Some(flash));
        }
        assert_eq!(Flash::from_code("nonsense"), None);
    }

    #[test]
    fn take_consumes_the_pending_flash() {
        let jar = CookieJar::new().add(Flash::LoggedOut.cookie());
        let (jar, flash) = Flash::take(jar);
        assert_eq!(flash, Some(Flash::LoggedOut));
        assert!(jar.get(FLASH_COOKIE).is_none());

        let (_, flash) = Flash::take(jar);
        assert_eq!(flash, None);
    }
}
