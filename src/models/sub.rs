//! Types related to sub-forums.

use diesel::result::DatabaseErrorKind;
use diesel::{insert_into, prelude::*};

use crate::models::{conv_constraint_error, Connection, InnerConnection};
use crate::schema::sub;
use crate::{Error, Result};

/// A sub ID.
pub type SubId = i32;

/// A sub-forum that posts are made to.
#[derive(Debug, Clone, PartialEq, Queryable, Selectable)]
#[diesel(table_name = sub)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Sub {
    /// The ID of the sub.
    pub id: SubId,
    /// The unique name of the sub.
    pub name: String,
    /// The description of the sub.
    pub description: String,
}

/// A new sub to be inserted in the database.
#[derive(Debug, Insertable)]
#[diesel(table_name = sub)]
pub struct NewSub {
    pub name: String,
    pub description: String,
}

/// Convenience function to convert from diesel's error type into our error
/// type, when we're querying for a sub.
fn conv_sub_error(sub_id: SubId) -> impl FnOnce(diesel::result::Error) -> Error {
    move |e: diesel::result::Error| match e {
        diesel::result::Error::NotFound => Error::SubNotFound { sub_id },
        _ => Error::from(e),
    }
}

/// Convenience function to convert from diesel's error type into our error
/// type, when we're inserting a sub.
fn conv_insert_error(name: String) -> impl FnOnce(diesel::result::Error) -> Error {
    move |e: diesel::result::Error| match e {
        diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            _,
        ) => Error::SubNameTaken { name },
        _ => conv_constraint_error(e),
    }
}

impl<C> Connection<C>
where
    C: InnerConnection,
{
    /// Get all subs.
    pub fn all_subs(&mut self) -> Result<Vec<Sub>> {
        use crate::schema::sub::columns::id;
        use crate::schema::sub::dsl::sub;

        Ok(sub
            .select(Sub::as_select())
            .order(id.asc())
            .load(self.inner.sqlite())?)
    }

    /// Get a sub.
    pub fn sub(&mut self, sub_id: SubId) -> Result<Sub> {
        use crate::schema::sub::columns::id;
        use crate::schema::sub::dsl::sub;

        sub.filter(id.eq(sub_id))
            .select(Sub::as_select())
            .first(self.inner.sqlite())
            .map_err(conv_sub_error(sub_id))
    }

    /// Insert a new sub into the database.
    ///
    /// Fails with `Error::SubNameTaken` if there's already a sub with the
    /// same name, in which case nothing is written.
    pub fn insert_sub(&mut self, new_sub: NewSub) -> Result<Sub> {
        use crate::schema::sub::dsl::sub;

        self.inner.sqlite().immediate_transaction::<_, Error, _>(|conn| {
            insert_into(sub)
                .values(&new_sub)
                .returning(Sub::as_returning())
                .get_result(conn)
                .map_err(conv_insert_error(new_sub.name.clone()))
        })
    }

    /// Get the number of subs in the database.
    pub fn num_subs(&mut self) -> Result<i64> {
        use crate::schema::sub::dsl::sub;

        Ok(sub.count().get_result(self.inner.sqlite())?)
    }
}
