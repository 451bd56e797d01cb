//! Routes for sub-forums.

use log::info;

use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{get, post, uri, State};

use crate::models::*;
use crate::routes::JsonParams;
use crate::views::{self, SubView};
use crate::Result;

/// List every sub.
#[get("/sub")]
pub async fn list_subs(db: &State<Database>) -> Result<Json<Vec<SubView>>> {
    let subs = db.run(|conn| conn.all_subs()).await?;

    Ok(views::many(&subs))
}

/// Create a new sub.
#[post("/sub", data = "<params>")]
pub async fn create_sub(
    params: Result<JsonParams>,
    db: &State<Database>,
) -> Result<Created<Json<SubView>>> {
    let params = params?;

    let new_sub = NewSub {
        name: params.string("name")?,
        description: params.string("description")?,
    };

    let sub = db.run(move |conn| conn.insert_sub(new_sub)).await?;

    info!("Created sub #{} '{}'", sub.id, sub.name);

    Ok(Created::new(uri!(get_sub(sub.id)).to_string()).body(views::one(&sub)))
}

/// Get a sub.
#[get("/sub/<sub_id>")]
pub async fn get_sub(sub_id: SubId, db: &State<Database>) -> Result<Json<SubView>> {
    let sub = db.run(move |conn| conn.sub(sub_id)).await?;

    Ok(views::one(&sub))
}
