//! Search filters rendered as a conjunctive `WHERE` clause.
//!
//! A filter spec is a record of independently optional constraints. Absent
//! members contribute nothing; present ones each add one predicate, and the
//! predicates are AND-ed together by the caller via [`Clause::where_sql`].
//! An empty spec yields an empty clause, meaning no `WHERE` at all.
//!
//! Predicates are appended in a fixed order per entity (see the
//! [`FilterSpec`] impls), which is also the order of the placeholders.

use crate::clause::Clause;
use crate::error::{JoblyError, JoblyResult};
use crate::value::Value;
use serde::Deserialize;

/// A set of optional search constraints for one entity.
pub trait FilterSpec {
    /// Reject structurally invalid specs (e.g. min > max).
    fn validate(&self) -> JoblyResult<()>;

    /// Append one predicate per present constraint, in a fixed order.
    fn append_predicates(&self, filters: &mut FilterBuilder);
}

/// Validate `spec`, then build its predicate list and aligned values.
///
/// Validation runs first; an invalid spec never produces predicates.
pub fn build_filters<F: FilterSpec + ?Sized>(spec: &F) -> JoblyResult<Clause> {
    spec.validate()?;
    let mut filters = FilterBuilder::new();
    spec.append_predicates(&mut filters);
    Ok(filters.finish())
}

/// Accumulates filter predicates over trusted, statically known column names.
#[derive(Debug, Default)]
pub struct FilterBuilder {
    clause: Clause,
}

impl FilterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// `column >= $n::bigint`
    ///
    /// The cast keeps bounds beyond the column's own integer width bindable.
    pub fn at_least(&mut self, column: &'static str, bound: Option<i64>) -> &mut Self {
        if let Some(bound) = bound {
            self.clause
                .push_bind_cast(&format!("{column} >= "), Value::Int(bound), "bigint");
        }
        self
    }

    /// `column <= $n::bigint`
    pub fn at_most(&mut self, column: &'static str, bound: Option<i64>) -> &mut Self {
        if let Some(bound) = bound {
            self.clause
                .push_bind_cast(&format!("{column} <= "), Value::Int(bound), "bigint");
        }
        self
    }

    /// `column > 0` when `flag` is `Some(true)`; binds nothing.
    pub fn positive(&mut self, column: &'static str, flag: Option<bool>) -> &mut Self {
        if flag == Some(true) {
            self.clause.push_const(format!("{column} > 0"));
        }
        self
    }

    /// `column ILIKE $n` bound to `%needle%`.
    ///
    /// `%`, `_` and `\` inside `needle` match literally. Empty needles are skipped.
    pub fn contains(&mut self, column: &'static str, needle: Option<&str>) -> &mut Self {
        if let Some(needle) = needle.filter(|n| !n.is_empty()) {
            let pattern = format!("%{}%", escape_like(needle));
            self.clause.push_bind(&format!("{column} ILIKE "), Value::Text(pattern));
        }
        self
    }

    pub fn finish(self) -> Clause {
        self.clause
    }
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn check_non_negative(field: &str, value: Option<i64>) -> JoblyResult<()> {
    match value {
        Some(v) if v < 0 => Err(JoblyError::validation(format!(
            "{field} must be greater than or equal to 0"
        ))),
        _ => Ok(()),
    }
}

/// Company search: employee-count range and name substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    pub min_employees: Option<i64>,
    pub max_employees: Option<i64>,
    pub name: Option<String>,
}

impl CompanyFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_employees(mut self, n: i64) -> Self {
        self.min_employees = Some(n);
        self
    }

    pub fn max_employees(mut self, n: i64) -> Self {
        self.max_employees = Some(n);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl FilterSpec for CompanyFilter {
    fn validate(&self) -> JoblyResult<()> {
        if let (Some(min), Some(max)) = (self.min_employees, self.max_employees) {
            if min > max {
                return Err(JoblyError::validation(
                    "Minimum employee number cannot be greater than maximum employee number.",
                ));
            }
        }
        check_non_negative("minEmployees", self.min_employees)?;
        check_non_negative("maxEmployees", self.max_employees)
    }

    /// Order: maxEmployees, minEmployees, name.
    fn append_predicates(&self, filters: &mut FilterBuilder) {
        filters
            .at_most("num_employees", self.max_employees)
            .at_least("num_employees", self.min_employees)
            .contains("name", self.name.as_deref());
    }
}

/// Job search: minimum salary, equity flag and title substring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    pub min_salary: Option<i64>,
    pub has_equity: Option<bool>,
    pub title: Option<String>,
}

impl JobFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_salary(mut self, n: i64) -> Self {
        self.min_salary = Some(n);
        self
    }

    pub fn has_equity(mut self, flag: bool) -> Self {
        self.has_equity = Some(flag);
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

impl FilterSpec for JobFilter {
    fn validate(&self) -> JoblyResult<()> {
        check_non_negative("minSalary", self.min_salary)
    }

    /// Order: minSalary, hasEquity, title.
    fn append_predicates(&self, filters: &mut FilterBuilder) {
        filters
            .at_least("salary", self.min_salary)
            .positive("equity", self.has_equity)
            .contains("title", self.title.as_deref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_spec_builds_nothing() {
        let c = build_filters(&CompanyFilter::new()).unwrap();
        assert!(c.is_empty());
        assert!(c.values().is_empty());
        assert_eq!(c.where_sql(), "");

        let j = build_filters(&JobFilter::new()).unwrap();
        assert!(j.is_empty());
    }

    #[test]
    fn company_filters_in_fixed_order() {
        let spec = CompanyFilter::new()
            .name("net")
            .min_employees(1)
            .max_employees(3);
        let c = build_filters(&spec).unwrap();
        assert_eq!(
            c.fragments(),
            [
                "num_employees <= $1::bigint",
                "num_employees >= $2::bigint",
                "name ILIKE $3"
            ]
        );
        assert_eq!(
            c.values(),
            [Value::Int(3), Value::Int(1), Value::from("%net%")]
        );
    }

    #[test]
    fn min_greater_than_max_is_rejected() {
        let spec = CompanyFilter::new().min_employees(3).max_employees(1);
        let err = build_filters(&spec).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn equal_bounds_are_allowed() {
        let spec = CompanyFilter::new().min_employees(2).max_employees(2);
        assert_eq!(build_filters(&spec).unwrap().len(), 2);
    }

    #[test]
    fn negative_bounds_are_rejected() {
        assert!(build_filters(&CompanyFilter::new().min_employees(-1)).is_err());
        assert!(build_filters(&JobFilter::new().min_salary(-5)).is_err());
    }

    #[test]
    fn single_bound_skips_others() {
        let c = build_filters(&CompanyFilter::new().min_employees(2)).unwrap();
        assert_eq!(c.fragments(), ["num_employees >= $1::bigint"]);
        assert_eq!(c.values(), [Value::Int(2)]);
    }

    #[test]
    fn equity_flag_binds_no_value() {
        let spec = JobFilter::new().min_salary(200).has_equity(true).title("J2");
        let c = build_filters(&spec).unwrap();
        assert_eq!(
            c.fragments(),
            ["salary >= $1::bigint", "equity > 0", "title ILIKE $2"]
        );
        assert_eq!(c.values(), [Value::Int(200), Value::from("%J2%")]);
    }

    #[test]
    fn equity_false_adds_no_constraint() {
        let spec = JobFilter::new().min_salary(200).has_equity(false).title("J2");
        let c = build_filters(&spec).unwrap();
        assert_eq!(c.where_sql(), " WHERE salary >= $1::bigint AND title ILIKE $2");
    }

    #[test]
    fn bounds_wider_than_int4_keep_their_value() {
        let spec = JobFilter::new().min_salary(3_000_000_000);
        let c = build_filters(&spec).unwrap();
        assert_eq!(c.fragments(), ["salary >= $1::bigint"]);
        assert_eq!(c.values(), [Value::Int(3_000_000_000)]);
    }

    #[test]
    fn like_wildcards_in_input_are_escaped() {
        let c = build_filters(&JobFilter::new().title("100%_off")).unwrap();
        assert_eq!(c.values(), [Value::from(r"%100\%\_off%")]);
    }

    #[test]
    fn empty_substring_is_absent() {
        let c = build_filters(&CompanyFilter::new().name("")).unwrap();
        assert!(c.is_empty());
    }

    #[test]
    fn deserializes_camel_case_query() {
        let spec: JobFilter =
            serde_json::from_str(r#"{"minSalary":200,"hasEquity":true}"#).unwrap();
        assert_eq!(spec, JobFilter::new().min_salary(200).has_equity(true));

        let bad = serde_json::from_str::<JobFilter>(r#"{"maxSalary":1}"#);
        assert!(bad.is_err());
    }
}
