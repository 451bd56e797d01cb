//! Data guard for the JSON bodies of requests.

use std::convert::TryFrom;

use rocket::data::{self, Data, FromData, Limits};
use rocket::http::Status;
use rocket::outcome::Outcome;
use rocket::Request;

use serde_json::{Map, Value};

use crate::{Error, Result};

/// The fields of a JSON object sent as the body of a request.
///
/// A field that is `null` is treated the same as a missing field. Fields that
/// no route asks for are ignored.
#[derive(Debug, Default)]
pub struct JsonParams(Map<String, Value>);

#[rocket::async_trait]
impl<'r> FromData<'r> for JsonParams {
    type Error = Error;

    async fn from_data(req: &'r Request<'_>, data: Data<'r>) -> data::Outcome<'r, Self> {
        let limit = req.limits().get("json").unwrap_or(Limits::JSON);

        let body = match data.open(limit).into_string().await {
            Ok(body) if body.is_complete() => body.into_inner(),
            Ok(_) => {
                return Outcome::Error((
                    Status::PayloadTooLarge,
                    Error::BodyTooLarge { limit },
                ))
            }
            Err(cause) => {
                return Outcome::Error((
                    Status::BadRequest,
                    Error::BodyUnreadable { cause },
                ))
            }
        };

        match JsonParams::parse(&body) {
            Ok(params) => Outcome::Success(params),
            Err(e) => Outcome::Error((e.status(), e)),
        }
    }
}

impl JsonParams {
    /// Parse a request body, which has to be a JSON object.
    pub fn parse<S>(body: S) -> Result<JsonParams>
    where
        S: AsRef<str>,
    {
        let body = body.as_ref();

        // An empty body has no fields, the same as `{}`.
        if body.trim().is_empty() {
            return Ok(JsonParams::default());
        }

        match serde_json::from_str(body) {
            Ok(Value::Object(map)) => Ok(JsonParams(map)),
            Ok(_) => Err(Error::BodyNotObject),
            Err(cause) => Err(Error::BodyNotJson { cause }),
        }
    }

    fn value<S>(&self, name: S) -> Option<&Value>
    where
        S: AsRef<str>,
    {
        self.0.get(name.as_ref()).filter(|value| !value.is_null())
    }

    /// Whether a field was given, even as `null`.
    pub fn contains<S>(&self, name: S) -> bool
    where
        S: AsRef<str>,
    {
        self.0.contains_key(name.as_ref())
    }

    /// Get a required string field.
    pub fn string<S>(&self, name: S) -> Result<String>
    where
        S: AsRef<str>,
    {
        self.opt_string(name.as_ref())?.ok_or(Error::MissingParam {
            param: name.as_ref().into(),
        })
    }

    /// Get an optional string field.
    pub fn opt_string<S>(&self, name: S) -> Result<Option<String>>
    where
        S: AsRef<str>,
    {
        match self.value(name.as_ref()) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(_) => Err(Error::InvalidParam {
                param: name.as_ref().into(),
                expected: "a string",
            }),
        }
    }

    /// Get a required integer field.
    pub fn integer<S>(&self, name: S) -> Result<i32>
    where
        S: AsRef<str>,
    {
        self.opt_integer(name.as_ref())?.ok_or(Error::MissingParam {
            param: name.as_ref().into(),
        })
    }

    /// Get an integer field which has to be given, but can be `null`.
    pub fn nullable_integer<S>(&self, name: S) -> Result<Option<i32>>
    where
        S: AsRef<str>,
    {
        if !self.contains(name.as_ref()) {
            return Err(Error::MissingParam {
                param: name.as_ref().into(),
            });
        }

        self.opt_integer(name)
    }

    /// Get an optional integer field.
    pub fn opt_integer<S>(&self, name: S) -> Result<Option<i32>>
    where
        S: AsRef<str>,
    {
        let invalid = || Error::InvalidParam {
            param: name.as_ref().into(),
            expected: "a 32-bit integer",
        };

        match self.value(name.as_ref()) {
            None => Ok(None),
            Some(value) => value
                .as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .map(Some)
                .ok_or_else(invalid),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_fields() {
        let params =
            JsonParams::parse(r#"{"name": "programming", "sub": 3}"#).unwrap();

        assert_eq!(params.string("name").unwrap(), "programming");
        assert_eq!(params.integer("sub").unwrap(), 3);

        match params.string("description") {
            Err(Error::MissingParam { param }) => assert_eq!(param, "description"),
            other => panic!("expected MissingParam, got {:?}", other),
        }
    }

    #[test]
    fn null_is_missing() {
        let params = JsonParams::parse(r#"{"title": null, "sub": null}"#).unwrap();

        assert_eq!(params.opt_string("title").unwrap(), None);
        assert!(matches!(
            params.string("title"),
            Err(Error::MissingParam { .. })
        ));
        assert_eq!(params.nullable_integer("sub").unwrap(), None);
        assert!(matches!(
            params.nullable_integer("post"),
            Err(Error::MissingParam { .. })
        ));
    }

    #[test]
    fn wrong_types_are_invalid() {
        let params =
            JsonParams::parse(r#"{"title": 5, "post": "1", "sub": 4294967296}"#)
                .unwrap();

        assert!(matches!(
            params.string("title"),
            Err(Error::InvalidParam { .. })
        ));
        assert!(matches!(
            params.integer("post"),
            Err(Error::InvalidParam { .. })
        ));
        assert!(matches!(
            params.integer("sub"),
            Err(Error::InvalidParam { .. })
        ));
    }

    #[test]
    fn body_must_be_an_object() {
        assert!(matches!(
            JsonParams::parse("[1, 2]"),
            Err(Error::BodyNotObject)
        ));
        assert!(matches!(
            JsonParams::parse("{not json"),
            Err(Error::BodyNotJson { .. })
        ));
        assert!(!JsonParams::parse("").unwrap().contains("name"));
    }
}
