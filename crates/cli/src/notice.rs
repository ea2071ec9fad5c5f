// FILE: crates/cli/src/notice.rs
//! Turns failures into a short notice on stderr plus a log entry

use cinevault_config::ConfigError;
use cinevault_content_sources::SourceError;
use cinevault_core::{AppError, Classify, ErrorCategory};
use cinevault_library::LibraryError;
use console::style;
use std::error::Error as StdError;

const SET_KEY_HINT: &str = "Run `cinevault config set-key <KEY>` to store it.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    /// Expected state the user can fix in settings
    Hint,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

/// First classified error in the chain, outermost first
fn classify<'a>(err: &'a anyhow::Error) -> Option<&'a dyn Classify> {
    err.chain().find_map(as_classified)
}

fn as_classified<'a>(err: &'a (dyn StdError + 'static)) -> Option<&'a dyn Classify> {
    if let Some(e) = err.downcast_ref::<LibraryError>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<SourceError>() {
        return Some(e);
    }
    if let Some(e) = err.downcast_ref::<ConfigError>() {
        return Some(e);
    }
    err.downcast_ref::<AppError>().map(|e| e as &dyn Classify)
}

fn missing_api_key(err: &anyhow::Error) -> bool {
    err.chain().any(|e| {
        matches!(
            e.downcast_ref::<SourceError>(),
            Some(SourceError::MissingApiKey)
        ) || matches!(
            e.downcast_ref::<LibraryError>(),
            Some(LibraryError::Source(SourceError::MissingApiKey))
        )
    })
}

/// Builds the notice shown for `err`
pub fn render(err: &anyhow::Error) -> Notice {
    let Some(classified) = classify(err) else {
        return Notice {
            kind: NoticeKind::Error,
            message: format!("{:#}", err),
        };
    };

    if classified.category() == ErrorCategory::ConfigurationGap {
        let mut message = classified.user_message();
        if missing_api_key(err) {
            message = format!("{} {}", message, SET_KEY_HINT);
        }
        return Notice {
            kind: NoticeKind::Hint,
            message,
        };
    }

    Notice {
        kind: NoticeKind::Error,
        message: classified.user_message(),
    }
}

/// Logs `err` and prints its notice
pub fn report(err: &anyhow::Error) {
    match classify(err) {
        Some(c) => log::error!(
            "{:#} [category: {}, severity: {}, recovery: {}]",
            err,
            c.category(),
            c.severity(),
            c.recovery_action()
        ),
        None => log::error!("{:#}", err),
    }

    print(&render(err));
}

pub fn print(notice: &Notice) {
    match notice.kind {
        NoticeKind::Hint => eprintln!("{} {}", style("hint:").yellow().bold(), notice.message),
        NoticeKind::Error => eprintln!("{} {}", style("error:").red().bold(), notice.message),
    }
}
