//! Minimal inline fragments. Quizzy's pages are assembled client-side; the
//! server only produces the small gated fragments the front-end swaps in.

use crate::session::Flash;
use crate::users::repo::User;

/// Escape a value for interpolation into HTML text or attributes.
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn notice_html(notice: Option<(&str, &str)>) -> String {
    match notice {
        Some((level, message)) => format!(
            r#"<div class="notice notice-{}">{}</div>"#,
            escape(level),
            escape(message)
        ),
        None => String::new(),
    }
}

/// The logged-in shell: header with user context, navigation, and an empty
/// content area the front-end fills with fragments.
pub fn page_shell(user: &User, flash: Option<Flash>) -> String {
    let notice = notice_html(flash.map(|f| (f.level(), f.message())));
    let avatar = if user.has_avatar {
        r#"<img class="avatar" src="/profile_image" alt="avatar">"#
    } else {
        ""
    };
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Quizzy</title></head>
<body>
<header>
  {avatar}
  <span class="user-name">{name}</span>
  <span class="user-email">{email}</span>
  <a href="/logout">Log out</a>
</header>
{notice}
<nav>
  <a href="/home">Home</a>
  <a href="/overview">Overview</a>
  <a href="/analysis">Analysis</a>
  <a href="/createQuiz">Create quiz</a>
  <a href="/quizPage">Quiz</a>
  <a href="/profile">Profile</a>
</nav>
<main id="content"></main>
</body>
</html>
"#,
        avatar = avatar,
        name = escape(&format!("{} {}", user.first_name, user.last_name)),
        email = escape(&user.email),
        notice = notice,
    )
}

pub fn login_page(notice: Option<(&str, &str)>) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Log in - Quizzy</title></head>
<body>
{notice}
<form method="post" action="/login">
  <label>Email <input type="email" name="email"></label>
  <label>Password <input type="password" name="password"></label>
  <label><input type="checkbox" name="remember"> Remember me</label>
  <button type="submit">Log in</button>
</form>
<p>No account? <a href="/signup">Sign up</a></p>
</body>
</html>
"#,
        notice = notice_html(notice),
    )
}

pub fn signup_page(notice: Option<(&str, &str)>) -> String {
    format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign up - Quizzy</title></head>
<body>
{notice}
<form method="post" action="/signup">
  <label>First name <input type="text" name="first_name"></label>
  <label>Last name <input type="text" name="last_name"></label>
  <label>Email <input type="email" name="email"></label>
  <label>Password <input type="password" name="password"></label>
  <label>Confirm password <input type="password" name="confirm_password"></label>
  <label><input type="checkbox" name="terms"> I agree to the Terms &amp; Conditions</label>
  <button type="submit">Sign up</button>
</form>
<p>Already registered? <a href="/login">Log in</a></p>
</body>
</html>
"#,
        notice = notice_html(notice),
    )
}

/// Profile fragment: the user row plus the editor form, posted via AJAX to
/// /update_profile and /upload_profile_image.
pub fn profile_fragment(user: &User) -> String {
    let opt = |value: &Option<String>| escape(value.as_deref().unwrap_or(""));
    let avatar = if user.has_avatar {
        r#"<img class="avatar" src="/profile_image" alt="avatar">"#.to_string()
    } else {
        String::new()
    };
    format!(
        r#"<section id="profile">
{avatar}
<form id="profile-form" method="post" action="/update_profile">
  <label>First name <input type="text" name="first_name" value="{first_name}"></label>
  <label>Last name <input type="text" name="last_name" value="{last_name}"></label>
  <label>Email <input type="email" value="{email}" disabled></label>
  <label>Phone <input type="text" name="phone" value="{phone}"></label>
  <label>Grade <input type="text" name="grade" value="{grade}"></label>
  <label>Graduation year <input type="text" name="graduation_year" value="{graduation_year}"></label>
  <label>Nationality <input type="text" name="nationality" value="{nationality}"></label>
  <label>University <input type="text" name="university" value="{university}"></label>
  <button type="submit">Save</button>
</form>
<form id="avatar-form" method="post" action="/upload_profile_image" enctype="multipart/form-data">
  <input type="file" name="profile_image" accept="image/*">
  <button type="submit">Upload</button>
</form>
</section>
"#,
        avatar = avatar,
        first_name = escape(&user.first_name),
        last_name = escape(&user.last_name),
        email = escape(&user.email),
        phone = opt(&user.phone),
        grade = opt(&user.grade),
        graduation_year = opt(&user.graduation_year),
        nationality = opt(&user.nationality),
        university = opt(&user.university),
    )
}

pub fn overview_fragment() -> String {
    r#"<section id="overview"><h2>Overview</h2></section>"#.to_string()
}

pub fn analysis_fragment() -> String {
    r#"<section id="analysis"><h2>Analysis</h2></section>"#.to_string()
}

pub fn create_quiz_fragment() -> String {
    r#"<section id="create-quiz"><h2>Create quiz</h2></section>"#.to_string()
}

pub fn quiz_page_fragment() -> String {
    r#"<section id="quiz-page"><h2>Quiz</h2></section>"#.to_string()
}

pub fn home_fragment() -> String {
    r#"<section id="home"><h2>Home</h2></section>"#.to_string()
}
