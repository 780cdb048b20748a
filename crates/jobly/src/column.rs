//! Field-name to column-name mapping.
//!
//! The external API names fields in camelCase (`numEmployees`) while the
//! tables use snake_case (`num_employees`). Each entity carries a static
//! [`ColumnAliases`] table; fields without an entry are already column names.

/// An immutable alias table from external field name to persisted column name.
///
/// # Example
/// ```ignore
/// const ALIASES: ColumnAliases = ColumnAliases::new(&[("firstName", "first_name")]);
///
/// assert_eq!(ALIASES.resolve("firstName"), "first_name");
/// assert_eq!(ALIASES.resolve("age"), "age");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnAliases {
    entries: &'static [(&'static str, &'static str)],
}

impl ColumnAliases {
    /// An alias table with no entries; every field maps to itself.
    pub const EMPTY: ColumnAliases = ColumnAliases { entries: &[] };

    pub const fn new(entries: &'static [(&'static str, &'static str)]) -> Self {
        Self { entries }
    }

    /// Column name for `field`, or `field` itself when it has no alias.
    pub fn resolve<'a>(&self, field: &'a str) -> &'a str {
        self.entries
            .iter()
            .find(|(from, _)| *from == field)
            .map_or(field, |(_, to)| *to)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translate `field` through `aliases`. Total: unmapped names pass through.
pub fn resolve_column<'a>(field: &'a str, aliases: &ColumnAliases) -> &'a str {
    aliases.resolve(field)
}

/// Write `name` as a double-quoted SQL identifier, doubling embedded quotes.
pub(crate) fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for c in name.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    const USER_ALIASES: ColumnAliases = ColumnAliases::new(&[
        ("firstName", "first_name"),
        ("lastName", "last_name"),
    ]);

    #[test]
    fn aliased_field_resolves_to_column() {
        assert_eq!(resolve_column("firstName", &USER_ALIASES), "first_name");
        assert_eq!(resolve_column("lastName", &USER_ALIASES), "last_name");
    }

    #[test]
    fn unmapped_field_passes_through() {
        assert_eq!(resolve_column("email", &USER_ALIASES), "email");
        assert_eq!(resolve_column("firstName", &ColumnAliases::EMPTY), "firstName");
        assert_eq!(ColumnAliases::default(), ColumnAliases::EMPTY);
    }

    #[test]
    fn quoting_doubles_embedded_quotes() {
        let mut s = String::new();
        write_quoted(&mut s, "first_name");
        assert_eq!(s, r#""first_name""#);

        let mut s = String::new();
        write_quoted(&mut s, r#"x"=1; --"#);
        assert_eq!(s, r#""x""=1; --""#);
    }
}
