// FILE: crates/library/src/view.rs
//! Presentation-independent view state

use cinevault_core::{LibraryDocument, MovieRecord};
pub use cinevault_config::ViewMode;
use std::fmt;
use std::str::FromStr;

/// Which half of the library is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    ToWatch,
    Watched,
}

impl Tab {
    pub fn includes(&self, movie: &MovieRecord) -> bool {
        match self {
            Tab::ToWatch => !movie.watched,
            Tab::Watched => movie.watched,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::ToWatch => "To watch",
            Tab::Watched => "Watched",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tab::ToWatch => write!(f, "to-watch"),
            Tab::Watched => write!(f, "watched"),
        }
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "to-watch" | "towatch" | "to_watch" => Ok(Tab::ToWatch),
            "watched" => Ok(Tab::Watched),
            other => Err(format!("unknown tab '{}': use to-watch or watched", other)),
        }
    }
}

/// Active tab plus layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryView {
    pub tab: Tab,
    pub mode: ViewMode,
}

impl LibraryView {
    pub fn new(tab: Tab, mode: ViewMode) -> Self {
        Self { tab, mode }
    }

    /// Records on the active tab, in insertion order
    pub fn entries<'a>(&self, document: &'a LibraryDocument) -> Vec<&'a MovieRecord> {
        document
            .movies
            .iter()
            .filter(|m| self.tab.includes(m))
            .collect()
    }

    /// `(to_watch, watched)`
    pub fn counts(document: &LibraryDocument) -> (usize, usize) {
        let watched = document.watched().count();
        (document.len() - watched, watched)
    }
}

/// Rating after clicking star `clicked`: clicking the current rating clears it
pub fn toggled_star_rating(current: u8, clicked: u8) -> u8 {
    if current == clicked {
        0
    } else {
        clicked
    }
}
