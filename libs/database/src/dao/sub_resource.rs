use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait,
    IntoActiveModel, QueryFilter, TransactionTrait,
};
use serde_json::Value;
use std::fmt;
use tracing::{info, warn};

use super::resource::IdOf;
use super::schema::split_nested;
use super::{DaoError, DaoResult, FieldErrors, ResourceDao, UpdateSchema};

/// A one-to-one child row edited through its parent's payload
///
/// `field` is the key under which the child's payload is nested in the parent
/// update body. `owner` is the child column holding the parent's id.
pub struct SubResource<E: EntityTrait, C, U> {
    field: &'static str,
    owner: E::Column,
    dao: ResourceDao<E, C, U>,
}

impl<E: EntityTrait, C, U> Clone for SubResource<E, C, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: EntityTrait, C, U> Copy for SubResource<E, C, U> {}

impl<E: EntityTrait, C, U> fmt::Debug for SubResource<E, C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubResource")
            .field("field", &self.field)
            .field("resource", &self.dao.resource())
            .finish()
    }
}

impl<E: EntityTrait, C, U> SubResource<E, C, U> {
    pub const fn new(field: &'static str, owner: E::Column, dao: ResourceDao<E, C, U>) -> Self {
        Self { field, owner, dao }
    }

    pub fn field(&self) -> &'static str {
        self.field
    }

    pub fn dao(&self) -> &ResourceDao<E, C, U> {
        &self.dao
    }
}

impl<E, C, U> SubResource<E, C, U>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    IdOf<E>: Clone + fmt::Display,
{
    /// The child row owned by `owner_id`, if any.
    pub async fn find_for<Conn, V>(&self, db: &Conn, owner_id: V) -> DaoResult<Option<E::Model>>
    where
        Conn: ConnectionTrait,
        V: Into<sea_orm::Value>,
    {
        Ok(E::find().filter(self.owner.eq(owner_id)).one(db).await?)
    }

    /// The child row owned by `owner_id`, or `NotFound` naming the owner id.
    pub async fn get_for<Conn, V>(&self, db: &Conn, owner_id: V) -> DaoResult<E::Model>
    where
        Conn: ConnectionTrait,
        V: Into<sea_orm::Value> + fmt::Display,
    {
        let label = owner_id.to_string();
        self.find_for(db, owner_id)
            .await?
            .ok_or_else(|| self.dao.not_found(label))
    }
}

impl<E, C, U> ResourceDao<E, C, U>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    IdOf<E>: Clone + fmt::Display + Into<sea_orm::Value>,
    U: UpdateSchema<E::ActiveModel>,
{
    /// Updates the parent and its nested child in one transaction.
    ///
    /// `raw[sub.field()]` (when present and not null) is the child's update
    /// payload and everything else is the parent's. Both payloads are validated
    /// before any write and their errors are reported together, with child
    /// fields prefixed by the nested key. Any later failure, including a missing
    /// child row for a nested payload, rolls the parent update back. Without a
    /// nested payload the child is only read and may be absent.
    pub async fn update_with<Db, E2, C2, U2>(
        &self,
        db: &Db,
        id: IdOf<E>,
        raw: Value,
        sub: &SubResource<E2, C2, U2>,
    ) -> DaoResult<(E::Model, Option<E2::Model>)>
    where
        Db: TransactionTrait,
        E2: EntityTrait,
        E2::Model: IntoActiveModel<E2::ActiveModel> + Sync,
        E2::ActiveModel: ActiveModelTrait<Entity = E2> + ActiveModelBehavior + Send,
        IdOf<E2>: Clone + fmt::Display,
        U2: UpdateSchema<E2::ActiveModel>,
    {
        let (parent_raw, child_raw) = split_nested(raw, sub.field())?;
        let parent_input = self.validate_update(parent_raw);
        let child_input = child_raw
            .map(|raw| sub.dao().validate_update(raw))
            .transpose();
        let (parent_input, child_input) = combine(parent_input, child_input, sub.field())?;

        let txn = db.begin().await?;
        let outcome = async {
            let current = self.get(&txn, id.clone()).await?;
            let parent = self.apply_to(&txn, current, parent_input).await?;

            let child = match child_input {
                Some(input) => {
                    let child = sub.get_for(&txn, id.clone()).await?;
                    Some(sub.dao().apply_to(&txn, child, input).await?)
                }
                None => sub.find_for(&txn, id.clone()).await?,
            };
            Ok::<_, DaoError>((parent, child))
        }
        .await;

        match outcome {
            Ok(updated) => {
                txn.commit().await?;
                info!(
                    resource = self.resource(),
                    nested = sub.field(),
                    id = %id,
                    "Updated resource with nested sub-resource"
                );
                Ok(updated)
            }
            Err(err) => {
                if let Err(rollback_err) = txn.rollback().await {
                    warn!(error = %rollback_err, "Rollback failed");
                }
                Err(err)
            }
        }
    }
}

/// Merges the validation outcome of a parent and a nested payload so that the
/// client sees every problem at once.
fn combine<P, N>(
    parent: DaoResult<P>,
    nested: DaoResult<Option<N>>,
    field: &str,
) -> DaoResult<(P, Option<N>)> {
    match (parent, nested) {
        (Ok(parent), Ok(nested)) => Ok((parent, nested)),
        (parent, nested) => {
            let mut errors = FieldErrors::new();
            if let Err(err) = parent {
                match err {
                    DaoError::Validation(fields) => errors.extend(fields),
                    other => return Err(other),
                }
            }
            if let Err(err) = nested {
                match err {
                    DaoError::Validation(fields) => errors.extend_prefixed(field, fields),
                    other => return Err(other),
                }
            }
            Err(DaoError::Validation(errors))
        }
    }
}
