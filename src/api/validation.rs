/// Paths a post-login redirect may target. Anything else falls back to the
/// jokes list, closing the open-redirect hole an attacker-supplied
/// `redirectTo` would otherwise open.
const ALLOWED_REDIRECTS: [&str; 3] = ["/", "/jokes", "/jokes/new"];

pub fn validate_redirect_url(url: &str) -> &str {
    if ALLOWED_REDIRECTS.contains(&url) {
        url
    } else {
        "/jokes"
    }
}

pub fn validate_username(username: &str) -> Option<&'static str> {
    if username.len() < 4 {
        return Some("That username is too short");
    }
    None
}

pub fn validate_password(password: &str) -> Option<&'static str> {
    if password.len() < 6 {
        return Some("That password is too short");
    }
    None
}

pub fn validate_joke_name(name: &str) -> Option<&'static str> {
    if name.len() < 3 {
        return Some("That joke name is too short");
    }
    None
}

pub fn validate_joke_content(content: &str) -> Option<&'static str> {
    if content.len() < 10 {
        return Some("That joke is too short");
    }
    None
}
