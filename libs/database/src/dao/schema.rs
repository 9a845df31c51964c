use serde::de::DeserializeOwned;
use serde_json::Value;
use validator::Validate;

use super::error::BODY_FIELD;
use super::{DaoError, DaoResult};

/// Payload accepted when creating a resource whose active model is `A`
///
/// Implementors describe the client-facing shape; [`Validate`] carries the
/// per-field rules. Conversion may fail for checks that need more than one
/// field or that have side effects, such as hashing a password.
pub trait CreateSchema<A>: DeserializeOwned + Validate {
    fn into_active_model(self) -> DaoResult<A>;
}

/// Partial update payload for a resource whose active model is `A`
///
/// Every field is optional. `apply` sets only the fields present in the
/// payload, leaving the rest of the stored row untouched.
pub trait UpdateSchema<A>: DeserializeOwned + Validate {
    fn apply(self, model: &mut A);
}

/// Deserializes and validates a raw JSON payload into a schema.
pub fn parse<T>(raw: Value) -> DaoResult<T>
where
    T: DeserializeOwned + Validate,
{
    if !raw.is_object() {
        return Err(DaoError::invalid(BODY_FIELD, "expected a JSON object"));
    }
    let input: T = serde_json::from_value(raw)?;
    input.validate()?;
    Ok(input)
}

/// Splits `field` out of a JSON object payload. A `null` nested value counts as absent.
pub fn split_nested(raw: Value, field: &str) -> DaoResult<(Value, Option<Value>)> {
    match raw {
        Value::Object(mut map) => {
            let nested = map.remove(field).filter(|value| !value.is_null());
            Ok((Value::Object(map), nested))
        }
        _ => Err(DaoError::invalid(BODY_FIELD, "expected a JSON object")),
    }
}
