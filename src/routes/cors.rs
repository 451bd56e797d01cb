//! Cross-origin resource sharing.

use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::{options, Request, Response};

/// Response fairing which adds CORS headers to every response.
#[derive(Debug, Clone)]
pub struct Cors {
    allowed_origins: Vec<String>,
}

impl Cors {
    /// Allow requests from the given origins. `*` allows any origin.
    pub fn new(allowed_origins: Vec<String>) -> Cors {
        Cors { allowed_origins }
    }

    /// The value for `Access-Control-Allow-Origin` given a request's
    /// `Origin`, if the origin is allowed.
    pub fn allow_origin(&self, origin: Option<&str>) -> Option<String> {
        if self.allowed_origins.iter().any(|allowed| allowed == "*") {
            return Some("*".into());
        }

        origin
            .filter(|origin| {
                self.allowed_origins
                    .iter()
                    .any(|allowed| allowed.as_str() == *origin)
            })
            .map(String::from)
    }
}

#[rocket::async_trait]
impl Fairing for Cors {
    fn info(&self) -> Info {
        Info {
            name: "CORS",
            kind: Kind::Response,
        }
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let origin = req.headers().get_one("Origin");

        let allowed = match self.allow_origin(origin) {
            Some(allowed) => allowed,
            None => return,
        };

        if allowed != "*" {
            res.set_header(Header::new("Vary", "Origin"));
        }

        res.set_header(Header::new("Access-Control-Allow-Origin", allowed));
        res.set_header(Header::new(
            "Access-Control-Allow-Methods",
            "GET, POST, PUT, DELETE, OPTIONS",
        ));
        res.set_header(Header::new("Access-Control-Allow-Headers", "Content-Type"));
    }
}

/// Answer a CORS preflight request. The headers are added by `Cors`.
#[options("/<_..>")]
pub fn preflight() -> Status {
    Status::NoContent
}
