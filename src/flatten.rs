//! Flattening of attribute values into composite-keyed scalar pairs.

use crate::error::Result;
use crate::model::{AttributeDescriptor, AttributeValue, ScalarValue};
use crate::target::TargetConnection;

/// Separator between bean and attribute in a composite key.
pub const BEAN_SEPARATOR: char = '#';
/// Separator between attribute and field of a structured value.
pub const FIELD_SEPARATOR: char = '-';

/// Builds `bean#attribute`.
pub fn attribute_key(bean: &str, attribute: &str) -> String {
    format!("{}{}{}", bean, BEAN_SEPARATOR, attribute)
}

/// Flattens one value.
///
/// Structured values yield one pair per field (`bean#attribute-field`, fields in
/// key order); anything else yields a single `bean#attribute` pair.
pub fn flatten(bean: &str, attribute: &str, value: AttributeValue) -> Vec<(String, ScalarValue)> {
    let base = attribute_key(bean, attribute);
    match value {
        AttributeValue::Scalar(v) => vec![(base, v)],
        AttributeValue::Structured(fields) => fields
            .into_iter()
            .map(|(field, v)| (format!("{}{}{}", base, FIELD_SEPARATOR, field), v))
            .collect(),
    }
}

/// Reads and flattens one resolved attribute.
///
/// Unreadable attributes are skipped without touching the connection.
/// A read failure is returned to the caller as-is.
pub fn read_flattened<C>(
    conn: &mut C,
    descriptor: &AttributeDescriptor,
) -> Result<Vec<(String, ScalarValue)>>
where
    C: TargetConnection + ?Sized,
{
    if !descriptor.readable {
        return Ok(Vec::new());
    }
    let value = conn.read_attribute(&descriptor.bean, &descriptor.name)?;
    Ok(flatten(&descriptor.bean, &descriptor.name, value))
}
