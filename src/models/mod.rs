//! Models and types related to the database.

use std::fmt::Debug;
use std::time::Duration;

use diesel::connection::{Connection as DieselConnection, SimpleConnection};
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool};
use diesel::result::DatabaseErrorKind;
use diesel::sqlite::SqliteConnection;

use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use log::debug;

use crate::{Error, Result};

pub mod comment;
pub mod post;
pub mod sub;

pub use comment::*;
pub use post::*;
pub use sub::*;

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// A type which can be used as the inner connection of a `Connection`.
pub trait InnerConnection {
    /// The SQLite connection that queries are run on.
    fn sqlite(&mut self) -> &mut SqliteConnection;
}

impl InnerConnection for SqliteConnection {
    fn sqlite(&mut self) -> &mut SqliteConnection {
        self
    }
}

impl InnerConnection for diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>> {
    fn sqlite(&mut self) -> &mut SqliteConnection {
        &mut **self
    }
}

/// A connection to the database. Used for creating and retrieving data.
///
/// Every operation on sub-forums, posts and comments is implemented on this
/// type, see the `sub`, `post` and `comment` modules. Operations that write
/// run in an immediate transaction, which takes the write lock before the
/// first read.
pub struct Connection<C> {
    pub(crate) inner: C,
}

/// A connection taken from the server's connection pool.
pub type PooledConnection =
    Connection<diesel::r2d2::PooledConnection<ConnectionManager<SqliteConnection>>>;

/// A connection that isn't part of a pool, for command line tools and tests.
pub type SingleConnection = Connection<SqliteConnection>;

impl SingleConnection {
    /// Open a connection to the database and create any missing tables.
    pub fn establish<S>(url: S) -> Result<SingleConnection>
    where
        S: AsRef<str>,
    {
        let mut inner = SqliteConnection::establish(url.as_ref())?;
        run_migrations(&mut inner)?;

        Ok(Connection { inner })
    }
}

/// Create the tables if they don't exist yet.
fn run_migrations(conn: &mut SqliteConnection) -> Result<()> {
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(Error::DatabaseMigrationError)?;

    for version in applied {
        debug!("Applied database migration {}", version);
    }

    Ok(())
}

/// Settings applied to every connection the pool opens.
#[derive(Debug)]
struct ConnectionOptions {
    busy_timeout: Duration,
}

impl CustomizeConnection<SqliteConnection, diesel::r2d2::Error>
    for ConnectionOptions
{
    fn on_acquire(
        &self,
        conn: &mut SqliteConnection,
    ) -> std::result::Result<(), diesel::r2d2::Error> {
        let pragma = format!(
            "PRAGMA busy_timeout = {};",
            self.busy_timeout.as_millis()
        );

        conn.batch_execute(&pragma)
            .map_err(diesel::r2d2::Error::QueryError)
    }
}

/// A pool of connections to the database.
pub struct Database {
    pub pool: Pool<ConnectionManager<SqliteConnection>>,
}

impl Debug for Database {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        let state = self.pool.state();

        write!(
            fmt,
            "<#Database connections={} idle_connections={}>",
            state.connections, state.idle_connections,
        )?;

        Ok(())
    }
}

impl Database {
    /// Open a pool of connections to the database.
    ///
    /// Missing tables are created before the pool is returned. An in-memory
    /// URL gives every pooled connection its own database, so use a file.
    ///
    /// `pool_timeout` is how long to wait for a free connection before giving
    /// up with `Error::R2d2Error`.
    pub fn open<S>(
        url: S,
        pool_size: u32,
        busy_timeout: Duration,
        pool_timeout: Duration,
    ) -> Result<Database>
    where
        S: AsRef<str>,
    {
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_timeout(pool_timeout)
            .connection_customizer(Box::new(ConnectionOptions { busy_timeout }))
            .build(ConnectionManager::new(url.as_ref()))?;

        let mut conn = pool.get()?;
        run_migrations(&mut conn)?;
        // Persists in the file, so every pooled connection picks it up.
        conn.batch_execute("PRAGMA journal_mode = WAL;")?;

        Ok(Database { pool })
    }

    /// Take a connection from the pool.
    ///
    /// This blocks until a connection is free, use `run` from async code.
    pub fn get(&self) -> Result<PooledConnection> {
        Ok(Connection {
            inner: self.pool.get()?,
        })
    }

    /// Run `f` with a connection from the pool on a blocking thread, so that
    /// waiting for a connection or for the database doesn't hold up other
    /// requests.
    pub async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PooledConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();

        rocket::tokio::task::spawn_blocking(move || {
            let mut conn = Connection { inner: pool.get()? };
            f(&mut conn)
        })
        .await?
    }
}

/// Convert a constraint failure reported by the database into our error type.
///
/// Other errors are passed through unchanged.
pub(crate) fn conv_constraint_error(e: diesel::result::Error) -> Error {
    match e {
        diesel::result::Error::DatabaseError(kind, info)
            if is_constraint_kind(&kind) =>
        {
            Error::ConstraintViolation {
                message: info.message().to_string(),
            }
        }
        e => Error::from(e),
    }
}

fn is_constraint_kind(kind: &DatabaseErrorKind) -> bool {
    matches!(
        kind,
        DatabaseErrorKind::UniqueViolation
            | DatabaseErrorKind::ForeignKeyViolation
            | DatabaseErrorKind::NotNullViolation
            | DatabaseErrorKind::CheckViolation
    )
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A fresh in-memory database with all tables created.
    pub(crate) fn memory_db() -> SingleConnection {
        SingleConnection::establish(":memory:").expect("couldn't open database")
    }

    #[test]
    fn establish_creates_tables() {
        let mut db = memory_db();

        assert_eq!(db.num_subs().unwrap(), 0);
        assert_eq!(db.num_posts().unwrap(), 0);
        assert_eq!(db.num_comments().unwrap(), 0);
    }

    #[test]
    fn migrations_are_idempotent() {
        let mut db = memory_db();

        run_migrations(&mut db.inner).unwrap();
        db.inner
            .batch_execute(include_str!(
                "../../migrations/2021-03-14-000000_create_tables/up.sql"
            ))
            .unwrap();

        assert_eq!(db.num_subs().unwrap(), 0);
    }

    fn file_db(dir: &tempfile::TempDir, pool_size: u32) -> Database {
        let url = dir.path().join("pool.db");

        Database::open(
            url.to_string_lossy(),
            pool_size,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn pooled_connections_share_a_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let database = file_db(&dir, 2);

        database
            .get()
            .unwrap()
            .insert_sub(NewSub {
                name: "rust".into(),
                description: "crabs".into(),
            })
            .unwrap();

        assert_eq!(database.get().unwrap().num_subs().unwrap(), 1);
    }

    #[test]
    fn concurrent_writers_wait_for_each_other() {
        let dir = tempfile::TempDir::new().unwrap();
        let database = file_db(&dir, 8);

        let post = database
            .get()
            .unwrap()
            .insert_post(NewPost {
                user: "a".into(),
                title: "t".into(),
                text: "x".into(),
                sub: None,
            })
            .unwrap();
        let post_id = post.id;

        let errors: Vec<Error> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..8)
                .map(|worker| {
                    let database = &database;

                    scope.spawn(move || {
                        let mut errors = Vec::new();
                        let mut db = match database.get() {
                            Ok(db) => db,
                            Err(e) => return vec![e],
                        };

                        for i in 0..50 {
                            let result = if worker % 2 == 0 {
                                db.update_post(
                                    post_id,
                                    PostChanges {
                                        title: Some(format!("{}-{}", worker, i)),
                                        ..PostChanges::default()
                                    },
                                )
                                .map(|_| ())
                            } else {
                                db.insert_comment(NewComment {
                                    title: "t".into(),
                                    description: "d".into(),
                                    post: post_id,
                                })
                                .and_then(|comment| db.delete_comment(comment.id))
                                .map(|_| ())
                            };

                            if let Err(e) = result {
                                errors.push(e);
                            }
                        }

                        errors
                    })
                })
                .collect();

            workers
                .into_iter()
                .flat_map(|worker| worker.join().unwrap())
                .collect()
        });

        assert!(errors.is_empty(), "writes failed: {:?}", errors);

        let mut db = database.get().unwrap();
        assert_eq!(db.num_posts().unwrap(), 1);
        assert_eq!(db.num_comments().unwrap(), 0);
    }

    #[rocket::async_test]
    async fn run_uses_a_pooled_connection() {
        let dir = tempfile::TempDir::new().unwrap();
        let database = file_db(&dir, 1);

        let sub = database
            .run(|db| {
                db.insert_sub(NewSub {
                    name: "rust".into(),
                    description: "crabs".into(),
                })
            })
            .await
            .unwrap();

        let sub_id = sub.id;
        let found = database.run(move |db| db.sub(sub_id)).await.unwrap();

        assert_eq!(found, sub);
    }

    #[rocket::async_test]
    async fn run_gives_up_when_pool_is_exhausted() {
        let dir = tempfile::TempDir::new().unwrap();
        let url = dir.path().join("pool.db");
        let database = Database::open(
            url.to_string_lossy(),
            1,
            Duration::from_secs(5),
            Duration::from_millis(100),
        )
        .unwrap();

        let _held = database.get().unwrap();

        match database.run(|db| db.num_subs()).await {
            Err(e @ Error::R2d2Error(..)) => {
                assert_eq!(e.status(), rocket::http::Status::ServiceUnavailable)
            }
            other => panic!("expected R2d2Error, got {:?}", other),
        }
    }
}
