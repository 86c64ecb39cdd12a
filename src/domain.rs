use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const HELP_TEXT: &str = "\
Navigation
  j / k, Down / Up     select next / previous row on the page
  h / l, Left / Right  scroll columns
  n / p, PgDn / PgUp   next / previous page
  g / G, Home / End    first / last page

Filtering
  /                    search all columns (Enter applies, Esc cancels)
  c / C                next / previous category
  x                    clear search and category

Other
  Enter                show the selected product as a record
  y                    copy selected cell
  Esc                  leave record view or this popup
  ?                    this help
  q                    quit";

pub const NOT_AVAILABLE: &str = "N/A";
pub const ALL_CATEGORIES: &str = "All Categories";

#[derive(Debug)]
pub enum PVError {
    IoError(Error),
    InvalidSnapshot(serde_json::Error),
    DuplicateColumn(String),
    LoadingFailed(String),
    FileNotFound,
    PermissionDenied,
}

impl fmt::Display for PVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PVError::IoError(e) => write!(f, "io error: {e}"),
            PVError::InvalidSnapshot(e) => write!(f, "invalid product snapshot: {e}"),
            PVError::DuplicateColumn(key) => write!(f, "column \"{key}\" is defined twice"),
            PVError::LoadingFailed(reason) => write!(f, "loading failed: {reason}"),
            PVError::FileNotFound => write!(f, "file not found"),
            PVError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}

impl std::error::Error for PVError {}

impl From<Error> for PVError {
    fn from(err: Error) -> Self {
        PVError::IoError(err)
    }
}

impl From<serde_json::Error> for PVError {
    fn from(err: serde_json::Error) -> Self {
        PVError::InvalidSnapshot(err)
    }
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct PVConfig {
    pub event_poll_time: u64,
    pub page_size: usize,
    pub max_column_width: usize,
    #[setters(into)]
    pub category_field: String,
}

impl Default for PVConfig {
    fn default() -> Self {
        PVConfig {
            event_poll_time: 100,
            page_size: 10,
            max_column_width: 40,
            category_field: "category".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
}

#[derive(Debug, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    NextPage,
    PreviousPage,
    FirstPage,
    LastPage,
    NextCategory,
    PreviousCategory,
    ClearFilters,
    EnterSearch,
    CopyCell,
    Help,
    Enter,
    Exit,
    RawKey(KeyEvent),
}
