//! Sample records inserted when the table is recreated.

use crate::NewCourse;

/// Returns the sample courses, in insertion order.
pub fn sample_courses() -> Vec<NewCourse> {
    vec![
        NewCourse::new(
            "Getting Started with Enterprise-grade AI",
            "This course covers the foundations of Artificial Intelligence for business, \
             including the following topics: AI Evolution, AI Industry Adoption Trends, \
             Natural Language Processing and Virtual Agents.",
            "https://keyskill-clms.comprehend.ibm.com/course/view.php?id=236",
            "NLP, AI evolution, Virtual agents",
        ),
        NewCourse::new(
            "OpenDS4All",
            "OpenDS4All is a project created to accelerate the creation of data science \
             curriculum at academic institutions. The project hosts educational modules that \
             may be used as building blocks for a data science curriculum.",
            "https://github.com/odpi/OpenDS4All/",
            "OpenDS4All, Data science, Jupyter notebooks, Data engineering",
        ),
    ]
}
