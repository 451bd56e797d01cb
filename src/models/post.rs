//! Types related to posts.

use chrono::NaiveDateTime;

use diesel::{delete, insert_into, prelude::*, update};

use crate::models::{conv_constraint_error, Connection, InnerConnection, SubId};
use crate::schema::post;
use crate::{Error, Result};

/// A post ID.
pub type PostId = i32;

/// A user-made post on a sub.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = post)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Post {
    /// The ID of the post.
    pub id: PostId,
    /// When the post was created. Nothing sets this yet.
    pub timestamp: Option<NaiveDateTime>,
    /// The name of the author.
    pub user: String,
    /// The title of the post.
    pub title: String,
    /// The contents of the post.
    pub text: String,
    /// The sub that this post was made on. This isn't checked against the
    /// existing subs.
    pub sub: Option<SubId>,
}

/// A new post to be inserted in the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = post)]
pub struct NewPost {
    pub user: String,
    pub title: String,
    pub text: String,
    pub sub: Option<SubId>,
}

/// Changes to make to a post. Fields that are `None` are left alone.
///
/// The sub of a post can't be changed.
#[derive(Debug, Default, AsChangeset)]
#[diesel(table_name = post)]
pub struct PostChanges {
    pub user: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
}

impl PostChanges {
    /// Whether there is nothing to change.
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.title.is_none() && self.text.is_none()
    }
}

/// Convenience function to convert from diesel's error type into our error
/// type, when we're querying for a post.
fn conv_post_error(post_id: PostId) -> impl FnOnce(diesel::result::Error) -> Error {
    move |e: diesel::result::Error| match e {
        diesel::result::Error::NotFound => Error::PostNotFound { post_id },
        _ => Error::from(e),
    }
}

impl<C> Connection<C>
where
    C: InnerConnection,
{
    /// Get all posts.
    pub fn all_posts(&mut self) -> Result<Vec<Post>> {
        use crate::schema::post::columns::id;
        use crate::schema::post::dsl::post;

        Ok(post
            .select(Post::as_select())
            .order(id.asc())
            .load(self.inner.sqlite())?)
    }

    /// Get a post.
    pub fn post(&mut self, post_id: PostId) -> Result<Post> {
        use crate::schema::post::columns::id;
        use crate::schema::post::dsl::post;

        post.filter(id.eq(post_id))
            .select(Post::as_select())
            .first(self.inner.sqlite())
            .map_err(conv_post_error(post_id))
    }

    /// Insert a new post into the database.
    pub fn insert_post(&mut self, new_post: NewPost) -> Result<Post> {
        use crate::schema::post::dsl::post;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            insert_into(post)
                .values(&new_post)
                .returning(Post::as_returning())
                .get_result(conn)
                .map_err(conv_constraint_error)
        })
    }

    /// Update a post, returning the post as it is after the update.
    pub fn update_post(
        &mut self,
        post_id: PostId,
        changes: PostChanges,
    ) -> Result<Post> {
        use crate::schema::post::columns::id;
        use crate::schema::post::dsl::post;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            let current = post
                .filter(id.eq(post_id))
                .select(Post::as_select())
                .first(conn)
                .map_err(conv_post_error(post_id))?;

            if changes.is_empty() {
                return Ok(current);
            }

            update(post.filter(id.eq(post_id)))
                .set(&changes)
                .returning(Post::as_returning())
                .get_result(conn)
                .map_err(conv_constraint_error)
        })
    }

    /// Delete a post, returning the post as it was before it was deleted.
    ///
    /// Comments on the post are not deleted.
    pub fn delete_post(&mut self, post_id: PostId) -> Result<Post> {
        use crate::schema::post::columns::id;
        use crate::schema::post::dsl::post;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            let deleted = post
                .filter(id.eq(post_id))
                .select(Post::as_select())
                .first(conn)
                .map_err(conv_post_error(post_id))?;

            delete(post.filter(id.eq(post_id))).execute(conn)?;

            Ok(deleted)
        })
    }

    /// Get the number of posts in the database.
    pub fn num_posts(&mut self) -> Result<i64> {
        use crate::schema::post::dsl::post;

        Ok(post.count().get_result(self.inner.sqlite())?)
    }
}

#[cfg(test)]
mod tests {
    use crate::models::tests::memory_db;
    use crate::models::*;
    use crate::Error;

    fn new_post(sub: Option<SubId>) -> NewPost {
        NewPost {
            user: "a".into(),
            title: "t".into(),
            text: "x".into(),
            sub,
        }
    }

    #[test]
    fn insert_keeps_fields() {
        let mut db = memory_db();

        let created = db.insert_post(new_post(Some(1))).unwrap();

        assert_eq!(created.user, "a");
        assert_eq!(created.title, "t");
        assert_eq!(created.text, "x");
        assert_eq!(created.sub, Some(1));
        assert_eq!(created.timestamp, None);
        assert_eq!(db.post(created.id).unwrap(), created);
    }

    #[test]
    fn sub_is_not_checked() {
        let mut db = memory_db();

        let created = db.insert_post(new_post(Some(999))).unwrap();
        assert_eq!(created.sub, Some(999));

        let created = db.insert_post(new_post(None)).unwrap();
        assert_eq!(created.sub, None);
    }

    #[test]
    fn update_only_changes_given_fields() {
        let mut db = memory_db();

        let created = db.insert_post(new_post(Some(1))).unwrap();
        let updated = db
            .update_post(
                created.id,
                PostChanges {
                    title: Some("t2".into()),
                    ..PostChanges::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "t2");
        assert_eq!(updated.user, created.user);
        assert_eq!(updated.text, created.text);
        assert_eq!(updated.sub, created.sub);
        assert_eq!(db.post(created.id).unwrap(), updated);
    }

    #[test]
    fn empty_update_returns_current_post() {
        let mut db = memory_db();

        let created = db.insert_post(new_post(Some(1))).unwrap();
        let updated = db
            .update_post(created.id, PostChanges::default())
            .unwrap();

        assert_eq!(updated, created);
    }

    #[test]
    fn update_missing_post_is_not_found() {
        let mut db = memory_db();

        let changes = PostChanges {
            text: Some("y".into()),
            ..PostChanges::default()
        };

        match db.update_post(5, changes) {
            Err(Error::PostNotFound { post_id }) => assert_eq!(post_id, 5),
            other => panic!("expected PostNotFound, got {:?}", other),
        }
    }

    #[test]
    fn delete_returns_snapshot() {
        let mut db = memory_db();

        let created = db.insert_post(new_post(Some(1))).unwrap();
        let deleted = db.delete_post(created.id).unwrap();

        assert_eq!(deleted, created);
        assert!(matches!(
            db.post(created.id),
            Err(Error::PostNotFound { .. })
        ));
        assert!(matches!(
            db.delete_post(created.id),
            Err(Error::PostNotFound { .. })
        ));
    }

    #[test]
    fn ids_are_not_reused() {
        let mut db = memory_db();

        let first = db.insert_post(new_post(None)).unwrap();
        db.delete_post(first.id).unwrap();
        let second = db.insert_post(new_post(None)).unwrap();

        assert!(second.id > first.id);
    }
}
