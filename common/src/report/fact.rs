use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    General,
    Specific,
    Volatile,
    Other,
    Infrastructure,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::General,
        Category::Specific,
        Category::Volatile,
        Category::Other,
        Category::Infrastructure,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Category::General => "general information",
            Category::Specific => "specific information",
            Category::Volatile => "volatile information",
            Category::Other => "other information",
            Category::Infrastructure => "infrastructure",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// How much a view exposes. Ordered: a view with a higher ceiling shows
/// everything a lower one shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DetailLevel {
    Summary,
    Detailed,
    Full,
}

/// A named piece of gathered information.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FactRecord {
    pub category: Category,
    pub level: DetailLevel,
    pub name: String,
    pub value: String,
}

impl FactRecord {
    pub fn new(
        category: Category,
        level: DetailLevel,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            category,
            level,
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn visible_at(&self, ceiling: DetailLevel) -> bool {
        self.level <= ceiling
    }
}
