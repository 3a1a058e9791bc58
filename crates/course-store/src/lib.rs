pub mod course;
pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod seed;
pub mod store;

pub use common::CourseId;
pub use course::{Course, MAX_FIELD_LEN, NewCourse};
pub use error::{CourseStoreError, FieldErrors, Result};
pub use memory::InMemoryCourseStore;
pub use postgres::PostgresCourseStore;
pub use query::{DEFAULT_PAGE, DEFAULT_PER_PAGE, MAX_PER_PAGE, Page, PageRequest};
pub use seed::sample_courses;
pub use store::{CourseStore, CourseStoreExt};
