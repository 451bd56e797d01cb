//! Routes for comments.

use log::info;

use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{delete, get, post, put, uri, State};

use crate::models::*;
use crate::routes::JsonParams;
use crate::views::{self, CommentView};
use crate::Result;

/// List every comment.
#[get("/comment")]
pub async fn list_comments(db: &State<Database>) -> Result<Json<Vec<CommentView>>> {
    let comments = db.run(|conn| conn.all_comments()).await?;

    Ok(views::many(&comments))
}

/// Create a new comment on a post.
#[post("/comment", data = "<params>")]
pub async fn create_comment(
    params: Result<JsonParams>,
    db: &State<Database>,
) -> Result<Created<Json<CommentView>>> {
    let params = params?;

    let new_comment = NewComment {
        title: params.string("title")?,
        description: params.string("description")?,
        post: params.integer("post")?,
    };

    let comment = db.run(move |conn| conn.insert_comment(new_comment)).await?;

    info!("Created comment #{} on post #{}", comment.id, comment.post);

    Ok(Created::new(uri!(get_comment(comment.id)).to_string())
        .body(views::one(&comment)))
}

/// Get a comment.
#[get("/comment/<comment_id>")]
pub async fn get_comment(
    comment_id: CommentId,
    db: &State<Database>,
) -> Result<Json<CommentView>> {
    let comment = db.run(move |conn| conn.comment(comment_id)).await?;

    Ok(views::one(&comment))
}

/// Update the title or description of a comment.
#[put("/comment/<comment_id>", data = "<params>")]
pub async fn update_comment(
    comment_id: CommentId,
    params: Result<JsonParams>,
    db: &State<Database>,
) -> Result<Json<CommentView>> {
    let params = params?;

    let changes = CommentChanges {
        title: params.opt_string("title")?,
        description: params.opt_string("description")?,
    };

    let comment = db
        .run(move |conn| conn.update_comment(comment_id, changes))
        .await?;

    info!("Updated comment #{}", comment.id);

    Ok(views::one(&comment))
}

/// Delete a comment, responding with the comment that was deleted.
#[delete("/comment/<comment_id>")]
pub async fn delete_comment(
    comment_id: CommentId,
    db: &State<Database>,
) -> Result<Json<CommentView>> {
    let comment = db.run(move |conn| conn.delete_comment(comment_id)).await?;

    info!("Deleted comment #{}", comment.id);

    Ok(views::one(&comment))
}
