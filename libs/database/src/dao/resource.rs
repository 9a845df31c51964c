use sea_orm::{
    ActiveModelBehavior, ActiveModelTrait, ConnectionTrait, EntityTrait, IntoActiveModel,
    Iterable, PaginatorTrait, PrimaryKeyToColumn, PrimaryKeyTrait, QueryOrder, QuerySelect,
    Select,
};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, info};

use super::schema::parse;
use super::{
    CreateSchema, DaoError, DaoResult, Page, PageBounds, PageRequest, PageResult, UpdateSchema,
};

/// Primary key value type of entity `E`
pub type IdOf<E> = <<E as EntityTrait>::PrimaryKey as PrimaryKeyTrait>::ValueType;

/// Generic data access object for one resource kind
///
/// `E` is the SeaORM entity, `C` the create schema and `U` the partial update
/// schema. Every method takes the connection explicitly and is generic over
/// [`ConnectionTrait`], so the same DAO runs against the pool or inside a
/// transaction owned by the caller.
///
/// Listings are ordered by primary key ascending.
///
/// ```ignore
/// const EVENT_TYPES: ResourceDao<event_type::Entity, CreateEventType, UpdateEventType> =
///     ResourceDao::new("event_type");
///
/// let created = EVENT_TYPES.create(&db, json!({ "name": "Conference" })).await?;
/// let page = EVENT_TYPES.paginated_list(&db, PageRequest::new(1, 20), &bounds).await?;
/// ```
pub struct ResourceDao<E, C, U> {
    resource: &'static str,
    marker: PhantomData<fn() -> (E, C, U)>,
}

impl<E, C, U> Clone for ResourceDao<E, C, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, C, U> Copy for ResourceDao<E, C, U> {}

impl<E, C, U> fmt::Debug for ResourceDao<E, C, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceDao")
            .field("resource", &self.resource)
            .finish()
    }
}

impl<E, C, U> ResourceDao<E, C, U> {
    /// `resource` names the kind in errors and logs, e.g. `"user"`.
    pub const fn new(resource: &'static str) -> Self {
        Self {
            resource,
            marker: PhantomData,
        }
    }

    pub fn resource(&self) -> &'static str {
        self.resource
    }

    pub fn not_found(&self, id: impl fmt::Display) -> DaoError {
        DaoError::not_found(self.resource, id)
    }
}

impl<E, C, U> ResourceDao<E, C, U>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    IdOf<E>: Clone + fmt::Display,
{
    pub async fn get<Conn: ConnectionTrait>(&self, db: &Conn, id: IdOf<E>) -> DaoResult<E::Model> {
        E::find_by_id(id.clone())
            .one(db)
            .await?
            .ok_or_else(|| self.not_found(&id))
    }

    /// Removes the row and returns it as it was before deletion.
    pub async fn delete<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        id: IdOf<E>,
    ) -> DaoResult<E::Model> {
        let existing = self.get(db, id.clone()).await?;

        let result = E::delete_by_id(id.clone()).exec(db).await?;
        if result.rows_affected == 0 {
            return Err(self.not_found(&id));
        }

        info!(resource = self.resource, id = %id, "Deleted resource");
        Ok(existing)
    }

    pub async fn list<Conn: ConnectionTrait>(&self, db: &Conn) -> DaoResult<Vec<E::Model>> {
        Ok(Self::ordered(E::find()).all(db).await?)
    }

    pub async fn paginated_list<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        request: PageRequest,
        bounds: &PageBounds,
    ) -> DaoResult<PageResult<E::Model>> {
        let window = request.validate(bounds)?;
        self.page_of(db, E::find(), window).await
    }

    /// Pages through an arbitrary (possibly filtered) query of this entity.
    pub async fn page_of<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        query: Select<E>,
        window: Page,
    ) -> DaoResult<PageResult<E::Model>> {
        let total_count = query.clone().count(db).await?;
        let results = Self::ordered(query)
            .offset(window.offset())
            .limit(window.limit())
            .all(db)
            .await?;

        Ok(PageResult::new(results, total_count, window))
    }

    /// Orders `query` by every primary key column, ascending.
    pub fn ordered(query: Select<E>) -> Select<E> {
        E::PrimaryKey::iter().fold(query, |query, key| query.order_by_asc(key.into_column()))
    }
}

impl<E, C, U> ResourceDao<E, C, U>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    IdOf<E>: Clone + fmt::Display,
    C: CreateSchema<E::ActiveModel>,
{
    /// Deserializes and validates a create payload without touching storage.
    pub fn validate_create(&self, raw: Value) -> DaoResult<C> {
        parse(raw)
    }

    pub async fn create<Conn: ConnectionTrait>(&self, db: &Conn, raw: Value) -> DaoResult<E::Model> {
        let input = self.validate_create(raw)?;
        self.create_from(db, input).await
    }

    /// Inserts an already validated create schema.
    pub async fn create_from<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        input: C,
    ) -> DaoResult<E::Model> {
        let model = input.into_active_model()?.insert(db).await?;
        info!(resource = self.resource, "Created resource");
        Ok(model)
    }
}

impl<E, C, U> ResourceDao<E, C, U>
where
    E: EntityTrait,
    E::Model: IntoActiveModel<E::ActiveModel> + Sync,
    E::ActiveModel: ActiveModelTrait<Entity = E> + ActiveModelBehavior + Send,
    IdOf<E>: Clone + fmt::Display,
    U: UpdateSchema<E::ActiveModel>,
{
    /// Deserializes and validates an update payload without touching storage.
    pub fn validate_update(&self, raw: Value) -> DaoResult<U> {
        parse(raw)
    }

    /// Partial update: only fields present in `raw` change. Validation runs before
    /// the lookup, so an invalid payload is rejected even for an unknown id.
    pub async fn update<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        id: IdOf<E>,
        raw: Value,
    ) -> DaoResult<E::Model> {
        let input = self.validate_update(raw)?;
        let current = self.get(db, id.clone()).await?;
        let updated = self.apply_to(db, current, input).await?;
        info!(resource = self.resource, id = %id, "Updated resource");
        Ok(updated)
    }

    /// Applies a validated update to a row the caller already loaded.
    pub async fn apply_to<Conn: ConnectionTrait>(
        &self,
        db: &Conn,
        current: E::Model,
        input: U,
    ) -> DaoResult<E::Model> {
        let mut active = current.clone().into_active_model();
        input.apply(&mut active);

        if !active.is_changed() {
            debug!(resource = self.resource, "Update changed no columns");
            return Ok(current);
        }

        Ok(active.update(db).await?)
    }
}
