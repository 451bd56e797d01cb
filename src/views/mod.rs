//! Views, the JSON shapes that models are returned as.
//!
//! Each model has exactly one view, and the fields of the view are the only
//! fields a client ever sees. Related records are never expanded: a post's sub
//! and a comment's post are given as IDs.

use rocket::serde::json::Json;

use serde::Serialize;

use crate::models::*;

pub mod error;

/// A model that can be shown to clients.
pub trait Schema {
    /// The fields of the model that are shown, in order.
    type View: Serialize;

    fn view(&self) -> Self::View;
}

/// Render a single record.
pub fn one<T>(record: &T) -> Json<T::View>
where
    T: Schema,
{
    Json(record.view())
}

/// Render a list of records, each with the same fields as `one` would give.
pub fn many<T>(records: &[T]) -> Json<Vec<T::View>>
where
    T: Schema,
{
    Json(records.iter().map(T::view).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubView {
    pub id: SubId,
    pub name: String,
    pub description: String,
}

impl Schema for Sub {
    type View = SubView;

    fn view(&self) -> SubView {
        SubView {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

/// A post. The timestamp is left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostView {
    pub id: PostId,
    pub user: String,
    pub title: String,
    pub text: String,
    pub sub: Option<SubId>,
}

impl Schema for Post {
    type View = PostView;

    fn view(&self) -> PostView {
        PostView {
            id: self.id,
            user: self.user.clone(),
            title: self.title.clone(),
            text: self.text.clone(),
            sub: self.sub,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentView {
    pub id: CommentId,
    pub title: String,
    pub description: String,
    pub post: PostId,
}

impl Schema for Comment {
    type View = CommentView;

    fn view(&self) -> CommentView {
        CommentView {
            id: self.id,
            title: self.title.clone(),
            description: self.description.clone(),
            post: self.post,
        }
    }
}
