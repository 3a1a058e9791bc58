use serde::{Deserialize, Serialize};

/// Primary key of a course record (the `EID` column).
///
/// Wraps the database integer so course ids cannot be mixed up with
/// page numbers or counts. Ids are assigned by the store on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(i32);

impl CourseId {
    /// Creates a course ID from a raw integer.
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    /// Returns the underlying integer.
    pub fn as_i32(&self) -> i32 {
        self.0
    }

    /// Returns the id that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl std::fmt::Display for CourseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for CourseId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<CourseId> for i32 {
    fn from(id: CourseId) -> Self {
        id.0
    }
}
