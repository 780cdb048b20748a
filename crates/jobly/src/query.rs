//! Pre-numbered SQL execution.

use crate::client::GenericClient;
use crate::error::JoblyResult;
use crate::row::FromRow;
use std::sync::Arc;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

const MAX_LOGGED_SQL: usize = 200;

/// A SQL string with pre-numbered placeholders (`$1, $2, ...`) plus bound parameters.
///
/// # Example
///
/// ```ignore
/// use jobly::query;
///
/// let job: Job = query("SELECT id, title FROM jobs WHERE id = $1")
///     .bind(job_id)
///     .fetch_one_as(&conn)
///     .await?;
/// ```
#[must_use]
pub struct Query {
    sql: String,
    params: Vec<Arc<dyn ToSql + Sync + Send>>,
    tag: Option<String>,
}

/// Create a new query with the given SQL
pub fn query(sql: impl Into<String>) -> Query {
    Query::new(sql)
}

impl Query {
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
            tag: None,
        }
    }

    /// Associate a tag, emitted with the SQL debug event.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Bind the next parameter.
    ///
    /// This does not modify the SQL string; it must already contain the
    /// matching placeholder.
    pub fn bind<T>(mut self, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.params.push(Arc::new(value));
        self
    }

    /// Bind several parameters in order.
    pub fn bind_all<T>(mut self, values: impl IntoIterator<Item = T>) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        for v in values {
            self.params.push(Arc::new(v));
        }
        self
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }

    fn trace(&self) {
        let sql = match self.sql.char_indices().nth(MAX_LOGGED_SQL) {
            Some((end, _)) => format!("{}...", &self.sql[..end]),
            None => self.sql.clone(),
        };
        tracing::debug!(
            target: "jobly.sql",
            tag = self.tag.as_deref().unwrap_or("-"),
            param_count = self.params.len(),
            sql = %sql,
        );
    }

    // ==================== Execution ====================

    /// Execute the query and return all rows
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> JoblyResult<Vec<Row>> {
        self.trace();
        let params = self.params_ref();
        conn.query(&self.sql, &params).await
    }

    /// Execute the query and return all rows mapped to type T
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the query and return the first row.
    ///
    /// 0 rows is [`JoblyError::NotFound`](crate::JoblyError::NotFound).
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> JoblyResult<Row> {
        self.trace();
        let params = self.params_ref();
        conn.query_one(&self.sql, &params).await
    }

    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> JoblyResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the query and return the first row, if any
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> JoblyResult<Option<Row>> {
        self.trace();
        let params = self.params_ref();
        conn.query_opt(&self.sql, &params).await
    }

    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> JoblyResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the statement and return the number of affected rows
    pub async fn execute(&self, conn: &impl GenericClient) -> JoblyResult<u64> {
        self.trace();
        let params = self.params_ref();
        conn.execute(&self.sql, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn binds_accumulate_in_order() {
        let q = query("UPDATE jobs SET \"title\"=$1, \"salary\"=$2 WHERE id = $3")
            .bind_all([Value::from("NEW"), Value::Int(100_000)])
            .bind(7_i32);
        assert_eq!(q.param_count(), 3);
        assert!(q.sql().starts_with("UPDATE jobs"));
    }
}
