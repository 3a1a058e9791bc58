use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};

use crate::{
    Course, CourseId, CourseStoreError, NewCourse, Page, PageRequest, Result,
    query::contains_pattern,
    store::{CourseStore, validate_seed},
};

const TABLE_NAME: &str = "courses";
const COLUMNS: &str = "eid, name, introduce, link, tags";

/// PostgreSQL-backed course store.
#[derive(Clone)]
pub struct PostgresCourseStore {
    pool: PgPool,
    schema: Option<String>,
}

impl PostgresCourseStore {
    /// Creates a store using the `courses` table on the connection's search path.
    pub fn new(pool: PgPool) -> Self {
        Self { pool, schema: None }
    }

    /// Places the table in `schema` instead of the default search path.
    ///
    /// The name is interpolated into SQL, so only plain identifiers are accepted.
    pub fn with_schema(mut self, schema: impl Into<String>) -> Result<Self> {
        let schema = schema.into();
        if !is_plain_identifier(&schema) {
            return Err(CourseStoreError::InvalidSchema(schema));
        }
        self.schema = Some(schema);
        Ok(self)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the table name as it appears in SQL, schema-qualified if configured.
    pub fn table(&self) -> String {
        match &self.schema {
            Some(schema) => format!("\"{schema}\".{TABLE_NAME}"),
            None => TABLE_NAME.to_string(),
        }
    }

    /// Creates the schema and table if they do not exist yet.
    pub async fn ensure_table(&self) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        self.create_objects(&mut tx, true).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn create_objects(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        if_not_exists: bool,
    ) -> Result<()> {
        if let Some(schema) = &self.schema {
            sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS \"{schema}\""))
                .execute(&mut **tx)
                .await?;
        }

        let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
        let sql = format!(
            r#"
            CREATE TABLE {guard}{table} (
                eid SERIAL PRIMARY KEY,
                name VARCHAR(255) NOT NULL,
                introduce VARCHAR(255) NOT NULL,
                link VARCHAR(255) NOT NULL,
                tags VARCHAR(255) NOT NULL
            )
            "#,
            table = self.table(),
        );
        sqlx::query(&sql).execute(&mut **tx).await?;
        Ok(())
    }

    async fn insert_in(
        &self,
        tx: &mut Transaction<'static, Postgres>,
        course: &NewCourse,
    ) -> Result<CourseId> {
        let sql = format!(
            "INSERT INTO {} (name, introduce, link, tags) VALUES ($1, $2, $3, $4) RETURNING eid",
            self.table()
        );
        let eid: i32 = sqlx::query_scalar(&sql)
            .bind(&course.name)
            .bind(&course.introduce)
            .bind(&course.link)
            .bind(&course.tags)
            .fetch_one(&mut **tx)
            .await?;
        Ok(CourseId::new(eid))
    }

    fn row_to_course(row: PgRow) -> Result<Course> {
        Ok(Course {
            eid: CourseId::new(row.try_get("eid")?),
            name: row.try_get("name")?,
            introduce: row.try_get("introduce")?,
            link: row.try_get("link")?,
            tags: row.try_get("tags")?,
        })
    }
}

fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[async_trait]
impl CourseStore for PostgresCourseStore {
    async fn get(&self, eid: CourseId) -> Result<Option<Course>> {
        let sql = format!("SELECT {COLUMNS} FROM {} WHERE eid = $1", self.table());
        let row: Option<PgRow> = sqlx::query(&sql)
            .bind(eid.as_i32())
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>> {
        // ESCAPE '' keeps backslashes literal, matching the in-memory matcher.
        let sql = format!(
            "SELECT {COLUMNS} FROM {} WHERE name LIKE $1 ESCAPE '' ORDER BY eid ASC LIMIT 1",
            self.table()
        );
        let row: Option<PgRow> = sqlx::query(&sql)
            .bind(contains_pattern(name))
            .fetch_optional(&self.pool)
            .await?;

        row.map(Self::row_to_course).transpose()
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Course>> {
        let total = self.count().await?;

        let sql = format!(
            "SELECT {COLUMNS} FROM {} ORDER BY eid ASC LIMIT $1 OFFSET $2",
            self.table()
        );
        let rows = sqlx::query(&sql)
            .bind(request.limit() as i64)
            .bind(request.offset() as i64)
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_course)
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, request, total))
    }

    async fn insert(&self, course: NewCourse) -> Result<Course> {
        course.validate().map_err(CourseStoreError::Validation)?;

        let mut tx = self.pool.begin().await?;
        let eid = self.insert_in(&mut tx, &course).await?;
        tx.commit().await?;

        Ok(course.with_id(eid))
    }

    async fn delete(&self, eid: CourseId) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE eid = $1", self.table());
        let result = sqlx::query(&sql)
            .bind(eid.as_i32())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn recreate(&self, seed: &[NewCourse]) -> Result<usize> {
        validate_seed(seed)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", self.table()))
            .execute(&mut *tx)
            .await?;
        self.create_objects(&mut tx, false).await?;
        for course in seed {
            self.insert_in(&mut tx, course).await?;
        }

        tx.commit().await?;
        tracing::info!(table = %self.table(), rows = seed.len(), "course table recreated");
        Ok(seed.len())
    }

    async fn count(&self) -> Result<u64> {
        let sql = format!("SELECT COUNT(*) FROM {}", self.table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count as u64)
    }
}
