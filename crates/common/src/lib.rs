//! Shared types for the courses API.

mod types;

pub use types::CourseId;
