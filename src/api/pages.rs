//! Server-rendered HTML views.
//!
//! All user-supplied text flows through `html_escape` before it is
//! interpolated into markup.

use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

use crate::db::Joke;
use crate::services::AuthenticatedUser;

fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
{body}
</body>
</html>
"#,
        title = text(title),
    )
}

pub fn home_page() -> String {
    layout(
        "Jokebox",
        r#"<div class="container">
<div class="content">
<h1>Jokebox <span>J🤪KES</span></h1>
<nav>
<ul>
<li><a href="/jokes">Read Jokes</a></li>
<li><a href="/login">Login</a></li>
</ul>
</nav>
</div>
</div>"#,
    )
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Default)]
pub struct LoginView<'a> {
    pub login_type: &'a str,
    pub username: &'a str,
    pub password: &'a str,
    pub redirect_to: &'a str,
    pub username_error: Option<&'a str>,
    pub password_error: Option<&'a str>,
    pub form_error: Option<&'a str>,
}

fn field_error(error: Option<&str>, id: &str) -> String {
    error.map_or_else(String::new, |msg| {
        format!(
            r#"<p class="form-validation-error" role="alert" id="{id}">{}</p>"#,
            text(msg)
        )
    })
}

pub fn login_page(view: &LoginView) -> String {
    let register_selected = view.login_type == "register";
    let login_checked = if register_selected { "" } else { " checked" };
    let register_checked = if register_selected { " checked" } else { "" };

    let form_error = field_error(view.form_error, "form-error");

    let body = format!(
        r#"<div class="container">
<div class="content" data-light="">
<h1>Login</h1>
<form method="post" action="/login">
<input type="hidden" name="redirectTo" value="{redirect_to}">
<fieldset>
<legend class="sr-only">Login or Register?</legend>
<label><input type="radio" name="loginType" value="login"{login_checked}> Login</label>
<label><input type="radio" name="loginType" value="register"{register_checked}> Register</label>
</fieldset>
<div>
<label for="username-input">Username</label>
<input type="text" id="username-input" name="username" value="{username}">
{username_error}
</div>
<div>
<label for="password-input">Password</label>
<input type="password" id="password-input" name="password" value="{password}">
{password_error}
</div>
<div class="form-error-message">{form_error}</div>
<button type="submit" class="button">Submit</button>
</form>
</div>
<div class="links">
<ul>
<li><a href="/">Home</a></li>
<li><a href="/jokes">Jokes</a></li>
</ul>
</div>
</div>"#,
        redirect_to = attr(view.redirect_to),
        username = attr(view.username),
        password = attr(view.password),
        username_error = field_error(view.username_error, "username-error"),
        password_error = field_error(view.password_error, "password-error"),
    );

    layout("Jokebox | Login", &body)
}

// ============================================================================
// Jokes layout and sections
// ============================================================================

pub fn jokes_page(user: Option<&AuthenticatedUser>, recent: &[Joke], outlet: &str) -> String {
    let user_info = user.map_or_else(
        || r#"<a href="/login">Login</a>"#.to_string(),
        |u| {
            format!(
                r#"<div class="user-info">
<span>Hi, {username}</span>
<form action="/logout" method="post"><button type="submit" class="button">Logout</button></form>
</div>"#,
                username = text(&u.username),
            )
        },
    );

    let joke_links: String = recent
        .iter()
        .map(|joke| {
            format!(
                r#"<li><a href="/jokes/{id}">{name}</a></li>"#,
                id = joke.id,
                name = text(&joke.name),
            )
        })
        .collect();

    let body = format!(
        r#"<div class="jokes-layout">
<header class="jokes-header">
<div class="container">
<h1 class="home-link"><a href="/" title="Jokebox">J🤪KES</a></h1>
{user_info}
</div>
</header>
<main class="jokes-main">
<div class="container">
<div class="jokes-list">
<a href="/jokes">Get a random joke</a>
<p>Here are a few more jokes to check out:</p>
<ul>{joke_links}</ul>
<a href="/jokes/new" class="button">Add your own</a>
</div>
<div class="jokes-outlet">
{outlet}
</div>
</div>
</main>
</div>"#,
    );

    layout("Jokebox", &body)
}

pub fn random_joke_section(joke: &Joke) -> String {
    format!(
        r#"<div>
<p>Here's a random joke:</p>
<p>{content}</p>
<a href="/jokes/{id}">{name} Permalink</a>
</div>"#,
        content = text(&joke.content),
        id = joke.id,
        name = text(&joke.name),
    )
}

pub fn no_jokes_section() -> String {
    r#"<div class="error-container">There are no jokes to display.</div>"#.to_string()
}

pub fn joke_section(joke: &Joke, can_delete: bool) -> String {
    let delete_form = if can_delete {
        format!(
            r#"<form method="post" action="/jokes/{id}">
<button class="button" name="intent" type="submit" value="delete">Delete</button>
</form>"#,
            id = joke.id,
        )
    } else {
        String::new()
    };

    format!(
        r#"<div>
<p>Here's your hilarious joke:</p>
<p>{content}</p>
<a href="/jokes/{id}">{name} Permalink</a>
{delete_form}
</div>"#,
        content = text(&joke.content),
        id = joke.id,
        name = text(&joke.name),
    )
}

// ============================================================================
// New joke form
// ============================================================================

#[derive(Debug, Default)]
pub struct JokeFormView<'a> {
    pub name: &'a str,
    pub content: &'a str,
    pub name_error: Option<&'a str>,
    pub content_error: Option<&'a str>,
    pub form_error: Option<&'a str>,
}

pub fn new_joke_section(view: &JokeFormView) -> String {
    format!(
        r#"<div>
<p>Add your own hilarious joke!</p>
<form method="post" action="/jokes/new">
<div>
<label for="name">Name: <input type="text" name="name" id="name" value="{name}"></label>
{name_error}
</div>
<div>
<label for="content">Content: <textarea name="content" id="content">{content}</textarea></label>
{content_error}
</div>
<div class="form-error-message">{form_error}</div>
<button type="submit" class="button">Add</button>
</form>
</div>"#,
        name = attr(view.name),
        content = text(view.content),
        name_error = field_error(view.name_error, "name-error"),
        content_error = field_error(view.content_error, "content-error"),
        form_error = field_error(view.form_error, "form-error"),
    )
}

// ============================================================================
// Error pages
// ============================================================================

pub fn error_page(message: &str) -> String {
    layout(
        "Jokebox",
        &format!(
            r#"<div class="error-container">{}</div>"#,
            text(message)
        ),
    )
}

pub fn unauthorized_page(message: &str) -> String {
    layout(
        "Jokebox",
        &format!(
            r#"<div class="error-container">
<p>{}</p>
<a href="/login">Login</a>
</div>"#,
            text(message)
        ),
    )
}
