//! Rocket HTTP routes.

use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{catch, catchers, routes, Catcher, Request, Route};

use crate::views::error::ErrorView;

pub mod comment;
pub mod cors;
pub mod params;
pub mod post;
pub mod sub;

pub use params::JsonParams;

/// Get all routes.
pub fn routes() -> Vec<Route> {
    routes![
        crate::routes::sub::list_subs,
        crate::routes::sub::create_sub,
        crate::routes::sub::get_sub,
        crate::routes::post::list_posts,
        crate::routes::post::create_post,
        crate::routes::post::get_post,
        crate::routes::post::update_post,
        crate::routes::post::delete_post,
        crate::routes::comment::list_comments,
        crate::routes::comment::create_comment,
        crate::routes::comment::get_comment,
        crate::routes::comment::update_comment,
        crate::routes::comment::delete_comment,
        crate::routes::cors::preflight,
    ]
}

/// Get all error catchers.
pub fn catchers() -> Vec<Catcher> {
    catchers![crate::routes::default_catcher]
}

/// Render any error that wasn't turned into a response by a route, for
/// example an unknown path or an ID in the path that isn't a number.
#[catch(default)]
pub fn default_catcher(status: Status, req: &Request) -> (Status, Json<ErrorView>) {
    let (status, message) = match status.code {
        404 => (status, format!("Nothing at {} {}", req.method(), req.uri())),
        // Rocket forwards with 422 when a path segment doesn't parse.
        422 => (
            Status::BadRequest,
            format!("Couldn't parse the path {}", req.uri()),
        ),
        _ => (
            status,
            status.reason().unwrap_or("Unknown error").to_string(),
        ),
    };

    (status, Json(ErrorView::new(status, message)))
}
