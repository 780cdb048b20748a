//! Ordered SQL fragments with positionally aligned values.

use crate::value::Value;

/// An ordered list of SQL fragments plus the values their placeholders bind.
///
/// Each bound fragment gets placeholder `$n` where `n` is the 1-based position
/// its value occupies in [`Clause::values`] at the moment it is pushed.
/// Constant fragments consume no placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Clause {
    fragments: Vec<String>,
    values: Vec<Value>,
}

impl Clause {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `head` followed by the next placeholder, binding `value` to it.
    pub fn push_bind(&mut self, head: &str, value: Value) -> &mut Self {
        let idx = self.next_placeholder();
        let mut fragment = String::with_capacity(head.len() + 3);
        fragment.push_str(head);
        fragment.push('$');
        fragment.push_str(&idx.to_string());
        self.fragments.push(fragment);
        self.values.push(value);
        self
    }

    /// Like [`Clause::push_bind`], with the placeholder cast to `sql_type`
    /// (`head$n::sql_type`) so the server types the parameter from the cast.
    pub fn push_bind_cast(&mut self, head: &str, value: Value, sql_type: &str) -> &mut Self {
        self.push_bind(head, value);
        if let Some(fragment) = self.fragments.last_mut() {
            fragment.push_str("::");
            fragment.push_str(sql_type);
        }
        self
    }

    /// Append a fragment that binds nothing.
    pub fn push_const(&mut self, fragment: impl Into<String>) -> &mut Self {
        self.fragments.push(fragment.into());
        self
    }

    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn into_parts(self) -> (Vec<String>, Vec<Value>) {
        (self.fragments, self.values)
    }

    pub fn len(&self) -> usize {
        self.fragments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Index of the placeholder the next bound value would get.
    ///
    /// Callers appending their own parameters after the clause (the key in
    /// `UPDATE ... WHERE key = $n`) start from here.
    pub fn next_placeholder(&self) -> usize {
        self.values.len() + 1
    }

    pub fn join(&self, sep: &str) -> String {
        self.fragments.join(sep)
    }

    /// Render `" WHERE a AND b"`, or an empty string when there are no fragments.
    pub fn where_sql(&self) -> String {
        if self.fragments.is_empty() {
            return String::new();
        }
        format!(" WHERE {}", self.join(" AND "))
    }
}
