//! Types related to comments on posts.

use diesel::dsl::exists;
use diesel::{delete, insert_into, prelude::*, select, update};

use crate::models::{conv_constraint_error, Connection, InnerConnection, PostId};
use crate::schema::comment;
use crate::{Error, Result};

/// A comment ID.
pub type CommentId = i32;

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = comment)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Comment {
    /// The ID of the comment.
    pub id: CommentId,
    /// The title of the comment.
    pub title: String,
    /// The contents of the comment.
    pub description: String,
    /// The post that this comment was made on.
    pub post: PostId,
}

/// A new comment to be inserted in the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = comment)]
pub struct NewComment {
    pub title: String,
    pub description: String,
    pub post: PostId,
}

/// Changes to make to a comment. Fields that are `None` are left alone.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = comment)]
pub struct CommentChanges {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl CommentChanges {
    /// Whether there is nothing to change.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

/// Convenience function to convert from diesel's error type into our error
/// type, when we're querying for a comment.
fn conv_comment_error(
    comment_id: CommentId,
) -> impl FnOnce(diesel::result::Error) -> Error {
    move |e: diesel::result::Error| match e {
        diesel::result::Error::NotFound => Error::CommentNotFound { comment_id },
        _ => Error::from(e),
    }
}

impl<C> Connection<C>
where
    C: InnerConnection,
{
    /// Get all comments.
    pub fn all_comments(&mut self) -> Result<Vec<Comment>> {
        use crate::schema::comment::columns::id;
        use crate::schema::comment::dsl::comment;

        Ok(comment
            .select(Comment::as_select())
            .order(id.asc())
            .load(self.inner.sqlite())?)
    }

    /// Get a comment.
    pub fn comment(&mut self, comment_id: CommentId) -> Result<Comment> {
        use crate::schema::comment::columns::id;
        use crate::schema::comment::dsl::comment;

        comment
            .filter(id.eq(comment_id))
            .select(Comment::as_select())
            .first(self.inner.sqlite())
            .map_err(conv_comment_error(comment_id))
    }

    /// Insert a new comment into the database.
    ///
    /// The post being commented on has to exist, otherwise this fails with
    /// `Error::CommentPostNotFound` and nothing is written.
    pub fn insert_comment(&mut self, new_comment: NewComment) -> Result<Comment> {
        use crate::schema::comment::dsl::comment as table_comment;
        use crate::schema::post::columns::id as post_id;
        use crate::schema::post::dsl::post as table_post;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            let post_exists: bool =
                select(exists(table_post.filter(post_id.eq(new_comment.post))))
                    .get_result(conn)?;

            if !post_exists {
                return Err(Error::CommentPostNotFound {
                    post_id: new_comment.post,
                });
            }

            insert_into(table_comment)
                .values(&new_comment)
                .returning(Comment::as_returning())
                .get_result(conn)
                .map_err(conv_constraint_error)
        })
    }

    /// Update a comment, returning the comment as it is after the update.
    pub fn update_comment(
        &mut self,
        comment_id: CommentId,
        changes: CommentChanges,
    ) -> Result<Comment> {
        use crate::schema::comment::columns::id;
        use crate::schema::comment::dsl::comment;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            let current = comment
                .filter(id.eq(comment_id))
                .select(Comment::as_select())
                .first(conn)
                .map_err(conv_comment_error(comment_id))?;

            if changes.is_empty() {
                return Ok(current);
            }

            update(comment.filter(id.eq(comment_id)))
                .set(&changes)
                .returning(Comment::as_returning())
                .get_result(conn)
                .map_err(conv_constraint_error)
        })
    }

    /// Delete a comment, returning the comment as it was before it was
    /// deleted.
    pub fn delete_comment(&mut self, comment_id: CommentId) -> Result<Comment> {
        use crate::schema::comment::columns::id;
        use crate::schema::comment::dsl::comment;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            let deleted = comment
                .filter(id.eq(comment_id))
                .select(Comment::as_select())
                .first(conn)
                .map_err(conv_comment_error(comment_id))?;

            delete(comment.filter(id.eq(comment_id))).execute(conn)?;

            Ok(deleted)
        })
    }

    /// Get the number of comments in the database.
    pub fn num_comments(&mut self) -> Result<i64> {
        use crate::schema::comment::dsl::comment;

        Ok(comment.count().get_result(self.inner.sqlite())?)
    }
}
