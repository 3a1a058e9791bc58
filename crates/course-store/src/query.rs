use crate::FieldErrors;

/// Page number used when the client does not ask for one.
pub const DEFAULT_PAGE: u32 = 1;

/// Page size used when the client does not ask for one.
pub const DEFAULT_PER_PAGE: u32 = 20;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 30;

/// A validated page/offset window over the course table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    per_page: u32,
}

impl PageRequest {
    /// Validates raw client input.
    ///
    /// Takes signed values so that negative input is reported as a range
    /// violation rather than a parse failure.
    pub fn new(page: i64, per_page: i64) -> std::result::Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        if page < 1 {
            errors.add("page", "Must be greater than or equal to 1.");
        } else if page > i64::from(u32::MAX) {
            errors.add(
                "page",
                format!("Must be less than or equal to {}.", u32::MAX),
            );
        }
        if !(1..=i64::from(MAX_PER_PAGE)).contains(&per_page) {
            errors.add(
                "per_page",
                format!("Must be greater than or equal to 1 and less than or equal to {MAX_PER_PAGE}."),
            );
        }
        errors.into_result()?;
        Ok(Self {
            page: page as u32,
            per_page: per_page as u32,
        })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Number of rows to skip before this page starts.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.per_page)
    }

    /// Number of rows to return.
    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// One page of results plus the numbers needed to navigate the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Assembles a page from the rows fetched for `request`.
    pub fn new(items: Vec<T>, request: PageRequest, total: u64) -> Self {
        Self {
            items,
            page: request.page(),
            per_page: request.per_page(),
            total,
        }
    }

    /// Total number of pages; zero for an empty table.
    pub fn pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.pages()
    }

    pub fn prev_num(&self) -> Option<u32> {
        self.has_prev().then(|| self.page - 1)
    }

    pub fn next_num(&self) -> Option<u32> {
        self.has_next().then(|| self.page + 1)
    }

    /// True when a page past the first was requested but holds no rows.
    pub fn is_out_of_range(&self) -> bool {
        self.page > 1 && self.items.is_empty()
    }

    /// Maps the items, keeping the page numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total: self.total,
        }
    }
}

/// Builds the LIKE pattern for a "name contains" search.
///
/// `%` and `_` inside `name` are passed through and keep their wildcard
/// meaning.
pub fn contains_pattern(name: &str) -> String {
    format!("%{name}%")
}

/// Case-sensitive SQL LIKE matching: `%` matches any run of characters,
/// `_` matches exactly one.
pub fn like_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();

    // Greedy matcher with single-point backtracking to the last `%`.
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;
    while t < text.len() {
        if p < pattern.len() && pattern[p] == '%' {
            star = Some((p, t));
            p += 1;
        } else if p < pattern.len() && (pattern[p] == '_' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if let Some((star_p, star_t)) = star {
            p = star_p + 1;
            t = star_t + 1;
            star = Some((star_p, star_t + 1));
        } else {
            return false;
        }
    }
    pattern[p..].iter().all(|&c| c == '%')
}
