//! Enumerations and field types for tasks.
//!
//! A task carries exactly one of three fixed categories, used for grouping
//! and coloring on screen.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Fixed classification applied to every task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, ValueEnum, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    #[serde(alias = "casa", alias = "Home")]
    Home,
    #[serde(alias = "trabalho", alias = "Work")]
    Work,
    #[default]
    #[serde(alias = "outros", alias = "Other")]
    Other,
}

impl Category {
    /// All categories in picker order.
    pub const ALL: [Category; 3] = [Category::Home, Category::Work, Category::Other];

    /// Capitalised label for display.
    pub fn label(self) -> &'static str {
        match self {
            Category::Home => "Home",
            Category::Work => "Work",
            Category::Other => "Other",
        }
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(self) -> usize {
        match self {
            Category::Home => 0,
            Category::Work => 1,
            Category::Other => 2,
        }
    }
}
