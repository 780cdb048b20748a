//! Partial UPDATE construction.
//!
//! [`build_update`] turns a sparse, ordered set of field values into the
//! `SET` list of an `UPDATE` statement:
//!
//! ```ignore
//! let fields = UpdateFields::new().set("firstName", "Aliya").set("age", 32);
//! let set = build_update(fields, &ColumnAliases::new(&[("firstName", "first_name")]))?;
//!
//! assert_eq!(set.join(", "), r#""first_name"=$1, "age"=$2"#);
//! ```

use crate::clause::Clause;
use crate::column::{ColumnAliases, write_quoted};
use crate::error::{JoblyError, JoblyResult};
use crate::value::Value;

/// A sparse update: field name (external naming) to new value, in insertion order.
///
/// Only the fields present are touched; everything else keeps its stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateFields {
    fields: Vec<(String, Value)>,
}

impl UpdateFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Setting the same field again replaces its value in place.
    pub fn set(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field only when `value` is `Some`.
    pub fn set_opt<T: Into<Value>>(self, field: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(v) => self.set(field, v),
            None => self,
        }
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.iter().find(|(f, _)| f == field).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for UpdateFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = UpdateFields::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

/// Build from a JSON request body, keeping the body's key order.
impl TryFrom<serde_json::Map<String, serde_json::Value>> for UpdateFields {
    type Error = JoblyError;

    fn try_from(map: serde_json::Map<String, serde_json::Value>) -> JoblyResult<Self> {
        let mut fields = UpdateFields::new();
        for (k, v) in map {
            let value = Value::from_json(&k, v)?;
            fields.insert(k, value);
        }
        Ok(fields)
    }
}

/// Build the `SET` assignments for a partial update.
///
/// Field *i* (1-based, in insertion order) becomes `"<column>"=$i` where
/// `<column>` is the field resolved through `aliases`. Values are moved into
/// the clause unchanged and in the same order. The caller appends its own
/// `WHERE` parameter at [`Clause::next_placeholder`].
///
/// Fails with [`JoblyError::Validation`] when `fields` is empty.
pub fn build_update(fields: UpdateFields, aliases: &ColumnAliases) -> JoblyResult<Clause> {
    if fields.is_empty() {
        return Err(JoblyError::validation("no data to update"));
    }

    let mut clause = Clause::new();
    let mut head = String::new();
    for (field, value) in fields.fields {
        head.clear();
        write_quoted(&mut head, aliases.resolve(&field));
        head.push('=');
        clause.push_bind(&head, value);
    }
    Ok(clause)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALIASES: ColumnAliases = ColumnAliases::new(&[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
    ]);

    #[test]
    fn single_aliased_field() {
        let fields = UpdateFields::new().set("firstName", "Steffi");
        let set = build_update(fields, &ALIASES).unwrap();
        assert_eq!(set.join(", "), r#""first_name"=$1"#);
        assert_eq!(set.values(), [Value::from("Steffi")]);
    }

    #[test]
    fn aliased_and_plain_fields_keep_caller_order() {
        let fields = UpdateFields::new().set("firstName", "Aliya").set("age", 32);
        let set = build_update(fields, &ALIASES).unwrap();
        assert_eq!(set.join(", "), r#""first_name"=$1, "age"=$2"#);
        assert_eq!(set.values(), [Value::from("Aliya"), Value::Int(32)]);
    }

    #[test]
    fn unaliased_first_field() {
        let aliases = ColumnAliases::new(&[("lastName", "last_name")]);
        let fields = UpdateFields::new()
            .set("firstName", "Steffi")
            .set("lastName", "Thomann");
        let set = build_update(fields, &aliases).unwrap();
        assert_eq!(set.join(", "), r#""firstName"=$1, "last_name"=$2"#);
        assert_eq!(set.values(), [Value::from("Steffi"), Value::from("Thomann")]);
    }

    #[test]
    fn empty_update_is_rejected_for_any_alias_table() {
        for aliases in [ALIASES, ColumnAliases::EMPTY, ColumnAliases::default()] {
            let err = build_update(UpdateFields::new(), &aliases).unwrap_err();
            assert!(err.is_validation());
            assert!(err.to_string().contains("no data to update"));
        }
    }

    #[test]
    fn placeholder_index_matches_position() {
        let fields: UpdateFields = (0..5).map(|i| (format!("c{i}"), i)).collect();
        let set = build_update(fields, &ColumnAliases::EMPTY).unwrap();
        assert_eq!(set.len(), 5);
        assert_eq!(set.values().len(), 5);
        for (i, fragment) in set.fragments().iter().enumerate() {
            assert_eq!(fragment, &format!("\"c{i}\"=${}", i + 1));
        }
        assert_eq!(set.next_placeholder(), 6);
    }

    #[test]
    fn null_values_pass_through() {
        let fields = UpdateFields::new()
            .set("title", "NEW")
            .set("salary", Value::Null);
        let set = build_update(fields, &ColumnAliases::EMPTY).unwrap();
        assert_eq!(set.values(), [Value::from("NEW"), Value::Null]);
    }

    #[test]
    fn repeated_field_replaces_in_place() {
        let fields = UpdateFields::new()
            .set("name", "a")
            .set("description", "d")
            .set("name", "b");
        assert_eq!(fields.keys().collect::<Vec<_>>(), ["name", "description"]);
        assert_eq!(fields.get("name"), Some(&Value::from("b")));
    }

    #[test]
    fn json_body_keeps_key_order() {
        let body = serde_json::json!({ "numEmployees": 10, "logoUrl": "http://new.img", "name": "New" });
        let serde_json::Value::Object(map) = body else {
            unreachable!()
        };
        let fields = UpdateFields::try_from(map).unwrap();
        assert_eq!(
            fields.keys().collect::<Vec<_>>(),
            ["numEmployees", "logoUrl", "name"]
        );
    }
}
