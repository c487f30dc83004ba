use std::{fmt::Display, str::FromStr, sync::Arc};

pub const PREDEFINED_CATEGORIES: [&str; 5] = ["Qantas", "TfNSW", "TikTok", "Bear", "Todd"];
pub const OTHER_CATEGORY: &str = "Other";

/// Category picked for the next entry. `Other` carries free text typed by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelection {
    Predefined(&'static str),
    Other(String),
}

impl Default for CategorySelection {
    fn default() -> Self {
        Self::Predefined(PREDEFINED_CATEGORIES[0])
    }
}

impl CategorySelection {
    /// The category an entry will be recorded under. Empty when `Other` has no text yet.
    pub fn resolve(&self) -> Arc<str> {
        match self {
            CategorySelection::Predefined(name) => (*name).into(),
            CategorySelection::Other(custom) => custom.trim().into(),
        }
    }

    pub fn is_other(&self) -> bool {
        matches!(self, CategorySelection::Other(_))
    }
}

impl FromStr for CategorySelection {
    type Err = std::convert::Infallible;

    /// A predefined name (any case) selects it; anything else is a custom category.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Ok(PREDEFINED_CATEGORIES
            .iter()
            .copied()
            .find(|name| name.eq_ignore_ascii_case(s))
            .map(CategorySelection::Predefined)
            .unwrap_or_else(|| CategorySelection::Other(s.to_owned())))
    }
}

impl Display for CategorySelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CategorySelection::Predefined(name) => write!(f, "{name}"),
            CategorySelection::Other(custom) => write!(f, "{OTHER_CATEGORY} ({custom})"),
        }
    }
}
