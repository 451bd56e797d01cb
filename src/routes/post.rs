//! Routes for posts.

use log::{debug, info};

use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, uri, State};

use crate::models::*;
use crate::routes::JsonParams;
use crate::views::{self, PostView};
use crate::Result;

/// List every post.
#[get("/post")]
pub async fn list_posts(db: &State<Database>) -> Result<Json<Vec<PostView>>> {
    let posts = db.run(|conn| conn.all_posts()).await?;

    Ok(views::many(&posts))
}

/// Create a new post.
#[post("/post", data = "<params>")]
pub async fn create_post(
    params: Result<JsonParams>,
    db: &State<Database>,
) -> Result<Created<Json<PostView>>> {
    let params = params?;

    let new_post = NewPost {
        user: params.string("user")?,
        title: params.string("title")?,
        text: params.string("text")?,
        sub: params.nullable_integer("sub")?,
    };

    let post = db.run(move |conn| conn.insert_post(new_post)).await?;

    info!("Created post #{} on sub {:?}", post.id, post.sub);

    Ok(Created::new(uri!(get_post(post.id)).to_string()).body(views::one(&post)))
}

/// Get a post.
#[get("/post/<post_id>")]
pub async fn get_post(post_id: PostId, db: &State<Database>) -> Result<Json<PostView>> {
    let post = db.run(move |conn| conn.post(post_id)).await?;

    Ok(views::one(&post))
}

/// Update the title, text or user of a post.
///
/// A `sub` field is accepted but doesn't move the post.
#[put("/post/<post_id>", data = "<params>")]
pub async fn update_post(
    post_id: PostId,
    params: Result<JsonParams>,
    db: &State<Database>,
) -> Result<Json<PostView>> {
    let params = params?;

    if params.contains("sub") {
        debug!("Ignoring sub in update of post #{}", post_id);
    }

    let changes = PostChanges {
        user: params.opt_string("user")?,
        title: params.opt_string("title")?,
        text: params.opt_string("text")?,
    };

    let post = db
        .run(move |conn| conn.update_post(post_id, changes))
        .await?;

    info!("Updated post #{}", post.id);

    Ok(views::one(&post))
}

/// Delete a post, responding with the post that was deleted.
#[delete("/post/<post_id>")]
pub async fn delete_post(post_id: PostId, db: &State<Database>) -> Result<Json<PostView>> {
    let post = db.run(move |conn| conn.delete_post(post_id)).await?;

    info!("Deleted post #{}", post.id);

    Ok(views::one(&post))
}
