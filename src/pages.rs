//! Page shells served behind the route middleware.
//!
//! Each page is an empty document the front-end bundle mounts into. The
//! shell only names the page; everything else is rendered client-side.

use axum::{
    Router,
    extract::Path,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};

/// Known pages: (route, page id, title).
const PAGES: &[(&str, &str, &str)] = &[
    ("/", "home", "PongArcadia"),
    ("/auth/callback", "auth-callback", "Signing in"),
    ("/dashboard", "dashboard", "Dashboard"),
    ("/profile", "profile", "Profile"),
    ("/friends", "friends", "Friends"),
    ("/game", "game-lobby", "Play"),
    ("/leaderboard", "leaderboard", "Leaderboard"),
    ("/chat", "chat", "Chat"),
    ("/settings", "settings", "Settings"),
];

fn shell(page: &str, title: &str) -> Html<String> {
    Html(format!(
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{title}</title>\n<script type=\"module\" src=\"/static/app.js\"></script>\n\
         </head>\n<body>\n<div id=\"app\" data-page=\"{page}\"></div>\n</body>\n</html>\n"
    ))
}

async fn profile_of(Path(_username): Path<String>) -> Html<String> {
    shell("profile", "Profile")
}

async fn game(Path(_game_id): Path<String>) -> Html<String> {
    shell("game", "Game")
}

async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, shell("not-found", "Not found")).into_response()
}

async fn health() -> &'static str {
    "ok"
}

/// Router with every page, the health check and a 404 fallback.
pub fn router() -> Router {
    let mut router = Router::new();
    for &(route, page, title) in PAGES {
        router = router.route(route, get(move || async move { shell(page, title) }));
    }
    router
        .route("/profile/{username}", get(profile_of))
        .route("/game/{game_id}", get(game))
        .route("/healthz", get(health))
        .fallback(not_found)
}
