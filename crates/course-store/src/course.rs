use serde::{Deserialize, Serialize};

use crate::{CourseId, FieldErrors};

/// Maximum length, in characters, of every text column.
pub const MAX_FIELD_LEN: usize = 255;

/// Wire names of the text fields, as clients send and receive them.
pub const NAME_FIELD: &str = "Name";
pub const INTRODUCE_FIELD: &str = "Introduce";
pub const LINK_FIELD: &str = "Link";
pub const TAGS_FIELD: &str = "Tags";

/// A stored course record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Primary key, assigned on insert.
    pub eid: CourseId,

    /// Course title.
    pub name: String,

    /// Short introduction to the course content.
    pub introduce: String,

    /// Where the course can be taken.
    pub link: String,

    /// Comma separated topic tags.
    pub tags: String,
}

/// A course that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCourse {
    pub name: String,
    pub introduce: String,
    pub link: String,
    pub tags: String,
}

impl NewCourse {
    /// Creates a new unvalidated course record.
    pub fn new(
        name: impl Into<String>,
        introduce: impl Into<String>,
        link: impl Into<String>,
        tags: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            introduce: introduce.into(),
            link: link.into(),
            tags: tags.into(),
        }
    }

    /// Checks every field against the column limits, reporting all violations.
    pub fn validate(&self) -> std::result::Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        for (field, value) in [
            (NAME_FIELD, &self.name),
            (INTRODUCE_FIELD, &self.introduce),
            (LINK_FIELD, &self.link),
            (TAGS_FIELD, &self.tags),
        ] {
            if value.chars().count() > MAX_FIELD_LEN {
                errors.add(field, format!("Longer than maximum length {MAX_FIELD_LEN}."));
            }
        }
        errors.into_result()
    }

    /// Attaches an id, producing the stored form of this record.
    pub fn with_id(self, eid: CourseId) -> Course {
        Course {
            eid,
            name: self.name,
            introduce: self.introduce,
            link: self.link,
            tags: self.tags,
        }
    }
}
