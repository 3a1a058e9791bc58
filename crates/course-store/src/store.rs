use async_trait::async_trait;

use crate::{Course, CourseId, CourseStoreError, NewCourse, Page, PageRequest, Result};

/// Core trait for course table implementations.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CourseStore: Send + Sync {
    /// Retrieves a single course by its EID.
    ///
    /// Returns None if no such course exists.
    async fn get(&self, eid: CourseId) -> Result<Option<Course>>;

    /// Retrieves the first course whose name contains `name`.
    ///
    /// Matching follows SQL LIKE against `%name%`; ties resolve to the
    /// lowest EID.
    async fn find_by_name(&self, name: &str) -> Result<Option<Course>>;

    /// Retrieves one page of courses ordered by EID, with the total row count.
    async fn list(&self, request: PageRequest) -> Result<Page<Course>>;

    /// Validates and stores a new course, returning it with its assigned EID.
    async fn insert(&self, course: NewCourse) -> Result<Course>;

    /// Deletes a course.
    ///
    /// Returns false if there was nothing to delete.
    async fn delete(&self, eid: CourseId) -> Result<bool>;

    /// Drops and recreates the table, then inserts `seed` in order.
    ///
    /// The EID sequence restarts, so the first seeded course gets EID 1.
    /// Either the whole reset succeeds or the table is left as it was.
    /// Returns the number of rows inserted.
    async fn recreate(&self, seed: &[NewCourse]) -> Result<usize>;

    /// Counts the rows in the table.
    async fn count(&self) -> Result<u64>;
}

/// Extension trait providing convenience methods for course stores.
#[async_trait]
pub trait CourseStoreExt: CourseStore {
    /// Retrieves a course, treating absence as an error.
    async fn require(&self, eid: CourseId) -> Result<Course> {
        self.get(eid)
            .await?
            .ok_or(CourseStoreError::NotFound(eid))
    }

    /// Checks if a course exists.
    async fn exists(&self, eid: CourseId) -> Result<bool> {
        Ok(self.get(eid).await?.is_some())
    }
}

// Blanket implementation for all CourseStore implementations
impl<T: CourseStore + ?Sized> CourseStoreExt for T {}

/// Validates every seed record before a reset touches the table.
pub(crate) fn validate_seed(seed: &[NewCourse]) -> Result<()> {
    for course in seed {
        course.validate().map_err(CourseStoreError::Validation)?;
    }
    Ok(())
}
