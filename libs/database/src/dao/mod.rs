//! Generic resource access: validated create, partial update, delete, ordered and
//! paginated listing, and atomic nested updates.

mod error;
mod page;
mod resource;
mod schema;
mod sub_resource;

pub use error::{BODY_FIELD, DaoError, DaoResult, FieldErrors};
pub use page::{Page, PageBounds, PageRequest, PageResult};
pub use resource::{IdOf, ResourceDao};
pub use schema::{CreateSchema, UpdateSchema, parse, split_nested};
pub use sub_resource::SubResource;
