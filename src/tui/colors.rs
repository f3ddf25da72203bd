//! Color constants for the terminal user interface.

use ratatui::style::Color;

use crate::fields::Category;

/// Background, border and text colors for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryColors {
    pub background: Color,
    pub border: Color,
    pub text: Color,
}

/// Used for the clear-completed action
pub const ORANGE: Color = Color::Rgb(255, 152, 0);
/// Used for the clear-all action
pub const RED: Color = Color::Rgb(244, 67, 54);
/// Screen background
pub const LIGHT_GRAY: Color = Color::Rgb(245, 245, 245);

/// Palette for `category`.
pub fn category_colors(category: Category) -> CategoryColors {
    match category {
        Category::Home => CategoryColors {
            background: Color::Rgb(232, 245, 233),
            border: Color::Rgb(76, 175, 80),
            text: Color::Rgb(46, 125, 50),
        },
        Category::Work => CategoryColors {
            background: Color::Rgb(227, 242, 253),
            border: Color::Rgb(33, 150, 243),
            text: Color::Rgb(21, 101, 192),
        },
        Category::Other => CategoryColors {
            background: Color::Rgb(255, 243, 224),
            border: ORANGE,
            text: Color::Rgb(230, 81, 0),
        },
    }
}
