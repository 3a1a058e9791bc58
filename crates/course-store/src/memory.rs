use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    Course, CourseId, CourseStoreError, NewCourse, Page, PageRequest, Result,
    query::{contains_pattern, like_matches},
    store::{CourseStore, validate_seed},
};

#[derive(Debug)]
struct Table {
    rows: BTreeMap<CourseId, Course>,
    next_id: CourseId,
}

impl Default for Table {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            next_id: CourseId::new(1),
        }
    }
}

impl Table {
    fn insert(&mut self, course: NewCourse) -> Course {
        let eid = self.next_id;
        self.next_id = eid.next();
        let course = course.with_id(eid);
        self.rows.insert(eid, course.clone());
        course
    }
}

/// In-memory course store.
///
/// Provides the same interface as the PostgreSQL implementation. Used by
/// tests and when the server runs without a database.
#[derive(Clone, Default)]
pub struct InMemoryCourseStore {
    table: Arc<RwLock<Table>>,
}

impl InMemoryCourseStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `courses`.
    pub async fn with_courses(courses: Vec<NewCourse>) -> Result<Self> {
        let store = Self::new();
        for course in courses {
            store.insert(course).await?;
        }
        Ok(store)
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn get(&self, eid: CourseId) -> Result<Option<Course>> {
        let table = self.table.read().await;
        Ok(table.rows.get(&eid).cloned())
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Course>> {
        let pattern = contains_pattern(name);
        let table = self.table.read().await;
        Ok(table
            .rows
            .values()
            .find(|c| like_matches(&pattern, &c.name))
            .cloned())
    }

    async fn list(&self, request: PageRequest) -> Result<Page<Course>> {
        let table = self.table.read().await;
        let items = table
            .rows
            .values()
            .skip(request.offset() as usize)
            .take(request.limit() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, request, table.rows.len() as u64))
    }

    async fn insert(&self, course: NewCourse) -> Result<Course> {
        course.validate().map_err(CourseStoreError::Validation)?;
        let mut table = self.table.write().await;
        Ok(table.insert(course))
    }

    async fn delete(&self, eid: CourseId) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(table.rows.remove(&eid).is_some())
    }

    async fn recreate(&self, seed: &[NewCourse]) -> Result<usize> {
        validate_seed(seed)?;

        let mut fresh = Table::default();
        for course in seed {
            fresh.insert(course.clone());
        }

        let mut table = self.table.write().await;
        *table = fresh;
        Ok(seed.len())
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.table.read().await.rows.len() as u64)
    }
}
