use std::marker::PhantomData;
use std::sync::Arc;

use sea_orm::{DbConn, DbErr, EntityTrait, PrimaryKeyTrait, SqlErr};

use social_core::{Ctx, RepoError};

use crate::bounded::bounded;

/// Generic PostgreSQL store over one SeaORM entity.
pub struct PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub(crate) db: Arc<DbConn>,
    _entity: PhantomData<E>,
}

impl<E> PostgresBaseRepository<E>
where
    E: EntityTrait,
{
    pub fn new(db: impl Into<Arc<DbConn>>) -> Self {
        Self {
            db: db.into(),
            _entity: PhantomData,
        }
    }

    /// Load one row by primary key, `NotFound` when there is none.
    pub(crate) async fn fetch_by_id<ID>(&self, ctx: &Ctx, id: ID) -> Result<E::Model, RepoError>
    where
        E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    {
        bounded(ctx, async {
            E::find_by_id(id)
                .one(self.db.as_ref())
                .await
                .map_err(map_db_err)?
                .ok_or(RepoError::NotFound)
        })
        .await
    }

    /// Delete one row by primary key, `NotFound` when nothing was removed.
    pub(crate) async fn remove_by_id<ID>(&self, ctx: &Ctx, id: ID) -> Result<(), RepoError>
    where
        E::PrimaryKey: PrimaryKeyTrait<ValueType = ID>,
    {
        bounded(ctx, async {
            let result = E::delete_by_id(id)
                .exec(self.db.as_ref())
                .await
                .map_err(map_db_err)?;

            if result.rows_affected == 0 {
                return Err(RepoError::NotFound);
            }

            Ok(())
        })
        .await
    }
}

/// Translate a SeaORM error into the store taxonomy.
pub(crate) fn map_db_err(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => return RepoError::Conflict(detail),
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            return RepoError::Constraint(detail);
        }
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) => RepoError::NotFound,
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        other => {
            let message = other.to_string();
            if message.contains("duplicate key") || message.contains("unique constraint") {
                RepoError::Conflict(message)
            } else {
                RepoError::Query(message)
            }
        }
    }
}
