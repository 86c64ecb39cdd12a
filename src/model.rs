use arboard::Clipboard;
use ratatui::crossterm::event::KeyEvent;
use tracing::{debug, error, info, trace, warn};

use crate::columns::{CellValue, ColumnModel};
use crate::domain::{ALL_CATEGORIES, CMDMode, HELP_TEXT, Message, PVConfig, PVError};
use crate::inputter::{InputResult, Inputter};
use crate::snapshot::Snapshot;
use crate::view::{PageInfo, ViewEngine};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Status {
    LOADING,
    READY,
    FAILED,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    RECORD,
    POPUP,
    CMDINPUT,
}

/// Everything the ui needs to draw one frame.
#[derive(Debug, Clone)]
pub struct UIData {
    pub name: String,
    pub status: Status,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub selected_row: usize,
    pub page: PageInfo,
    pub listed_total: Option<u64>,
    pub search: String,
    pub category: String,
    pub show_record: bool,
    pub record: Vec<(String, String)>,
    pub record_row: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub active_cmdinput: bool,
    pub status_message: String,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            status: Status::LOADING,
            headers: Vec::new(),
            rows: Vec::new(),
            selected_row: 0,
            page: PageInfo::default(),
            listed_total: None,
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
            show_record: false,
            record: Vec::new(),
            record_row: 0,
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        }
    }
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    view: ViewEngine,
    name: String,
    listed_total: Option<u64>,
    curser_row: usize,
    offset_column: usize,
    record_row: usize,
    clipboard: Option<Clipboard>,
    input: Inputter,
    last_input: InputResult,
    cmd_mode: Option<CMDMode>,
    filter_before_search: String,
    status_message: String,
    uidata: UIData,
}

// Cells are shown on a single line
fn flatten(cell: &CellValue) -> String {
    cell.to_string().replace("\r\n", " ↵ ").replace('\n', " ↵ ")
}

impl Model {
    pub fn init(config: &PVConfig, columns: ColumnModel, name: impl Into<String>) -> Self {
        let view = ViewEngine::new(columns, config.category_field.clone(), config.page_size);
        let mut model = Self {
            status: Status::LOADING,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            view,
            name: name.into(),
            listed_total: None,
            curser_row: 0,
            offset_column: 0,
            record_row: 0,
            clipboard: None,
            input: Inputter::default(),
            last_input: InputResult::default(),
            cmd_mode: None,
            filter_before_search: String::new(),
            status_message: String::new(),
            uidata: UIData::empty(),
        };
        model.set_status_message("Loading ...");
        model.update_uidata();
        model
    }

    /// Hands the result of a fetch to the view. A failed fetch leaves the
    /// view empty and reports the error.
    pub fn load_snapshot(&mut self, snapshot: Result<Snapshot, PVError>) {
        match snapshot {
            Ok(snapshot) => {
                let count = snapshot.products.len();
                debug!(
                    "Backend listing: total {:?}, skip {:?}, limit {:?}",
                    snapshot.total, snapshot.skip, snapshot.limit
                );
                self.listed_total = snapshot.total;
                self.view.set_source(Some(snapshot));
                self.status = Status::READY;
                info!("Loaded {count} products");
                self.set_status_message(format!("Loaded {count} products"));
            }
            Err(e) => {
                error!("Loading products failed: {e}");
                self.listed_total = None;
                self.view.set_source(None);
                self.status = Status::FAILED;
                self.set_status_message(format!("Error loading products: {e}"));
            }
        }
        self.clamp_cursor();
        self.update_uidata();
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn raw_keyevents(&self) -> bool {
        self.modus == Modus::CMDINPUT
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), PVError> {
        let Some(msg) = message else {
            return Ok(());
        };
        trace!("Update: Modus {:?}, Message {:?}", self.modus, msg);
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_table_selection_up(),
                Message::MoveDown => self.move_table_selection_down(),
                Message::MoveLeft => self.offset_column = self.offset_column.saturating_sub(1),
                Message::MoveRight => self.move_table_selection_right(),
                Message::NextPage => self.change_page(ViewEngine::next_page),
                Message::PreviousPage => self.change_page(ViewEngine::previous_page),
                Message::FirstPage => self.change_page(ViewEngine::first_page),
                Message::LastPage => self.change_page(ViewEngine::last_page),
                Message::NextCategory => self.cycle_category(true),
                Message::PreviousCategory => self.cycle_category(false),
                Message::ClearFilters => self.clear_filters(),
                Message::EnterSearch => self.enter_cmd_mode(CMDMode::Search),
                Message::CopyCell => self.copy_table_cell(),
                Message::Help => self.show_help(),
                Message::Enter => self.enter(),
                _ => (),
            },
            Modus::RECORD => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.record_row = self.record_row.saturating_sub(1),
                Message::MoveDown => {
                    let last = self.view.headers().len().saturating_sub(1);
                    self.record_row = std::cmp::min(self.record_row + 1, last);
                }
                Message::CopyCell => self.copy_record_cell(),
                Message::Help => self.show_help(),
                Message::Exit => self.exit(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Enter | Message::Help => self.exit(),
                _ => (),
            },
            Modus::CMDINPUT => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
        self.update_uidata();
        Ok(())
    }

    // -------------------- Control handling functions ---------------------- //

    fn page_len(&self) -> usize {
        self.view.current_page_records().len()
    }

    fn clamp_cursor(&mut self) {
        self.curser_row = std::cmp::min(self.curser_row, self.page_len().saturating_sub(1));
    }

    fn change_page(&mut self, action: fn(&mut ViewEngine)) {
        let before = self.view.page_index();
        action(&mut self.view);
        if before != self.view.page_index() {
            self.curser_row = 0;
        }
    }

    fn move_table_selection_up(&mut self) {
        if self.curser_row > 0 {
            self.curser_row -= 1;
        } else if self.view.can_go_previous() {
            // Continue on the bottom of the previous page
            self.view.previous_page();
            self.curser_row = self.page_len().saturating_sub(1);
        }
    }

    fn move_table_selection_down(&mut self) {
        if self.curser_row + 1 < self.page_len() {
            self.curser_row += 1;
        } else if self.view.can_go_next() {
            // Continue on the top of the next page
            self.view.next_page();
            self.curser_row = 0;
        }
    }

    fn move_table_selection_right(&mut self) {
        if self.offset_column + 1 < self.view.headers().len() {
            self.offset_column += 1;
        }
    }

    fn cycle_category(&mut self, forward: bool) {
        let categories = self.view.distinct_categories();
        let options = categories.len() + 1;
        let current = self
            .view
            .state()
            .category
            .and_then(|c| categories.iter().position(|o| *o == c))
            .map_or(0, |p| p + 1);
        let next = if forward {
            (current + 1) % options
        } else {
            (current + options - 1) % options
        };
        let category = next.checked_sub(1).map(|i| categories[i].clone());
        self.view.set_categorical_filter(category.as_deref());
        self.curser_row = 0;
        self.report_matches();
    }

    fn clear_filters(&mut self) {
        self.view.set_global_filter("");
        self.view.set_categorical_filter(None);
        self.curser_row = 0;
        self.set_status_message("Filters cleared");
    }

    fn report_matches(&mut self) {
        let count = self.view.filtered_count();
        if count == 0 {
            self.set_status_message("Found no matches!");
        } else {
            self.set_status_message(format!("Found {count} products"));
        }
    }

    fn enter(&mut self) {
        if self.page_len() == 0 {
            return;
        }
        self.previous_modus = self.modus;
        self.modus = Modus::RECORD;
        self.record_row = 0;
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::RECORD => {
                self.previous_modus = Modus::RECORD;
                self.modus = Modus::TABLE;
            }
            Modus::POPUP => {
                trace!("Close popup ...");
                self.modus = self.previous_modus;
                self.previous_modus = Modus::POPUP;
            }
            Modus::TABLE | Modus::CMDINPUT => {}
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CMDINPUT;
        self.cmd_mode = Some(mode);

        self.filter_before_search = self.view.state().global_filter;
        self.input.clear();
        self.input.set(&self.filter_before_search);
        self.last_input = self.input.get();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        self.last_input = self.input.read(key);
        match self.cmd_mode {
            Some(CMDMode::Search) => {
                if self.last_input.canceled {
                    self.view.set_global_filter(self.filter_before_search.clone());
                } else {
                    // The table follows the prompt while typing
                    self.view.set_global_filter(self.last_input.input.clone());
                }
                self.curser_row = 0;
            }
            None => warn!("Raw input without a command mode"),
        }
        if self.last_input.finished {
            self.handle_cmd_input();
        }
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CMDINPUT;
        self.cmd_mode = None;
        if self.last_input.canceled {
            self.set_status_message("Search canceled");
        } else {
            self.report_matches();
        }
        self.input.clear();
        self.last_input = self.input.get();
    }

    fn selected_cells(&self) -> Option<Vec<CellValue>> {
        self.view
            .current_page_records()
            .get(self.curser_row)
            .map(|record| self.view.columns().cells(record))
    }

    fn copy_table_cell(&mut self) {
        let cell = self
            .selected_cells()
            .and_then(|cells| cells.get(self.offset_column).map(|c| c.to_string()));
        if let Some(cell) = cell {
            self.copy_to_clipboard(cell);
        }
    }

    fn copy_record_cell(&mut self) {
        let cell = self
            .selected_cells()
            .and_then(|cells| cells.get(self.record_row).map(|c| c.to_string()));
        if let Some(cell) = cell {
            self.copy_to_clipboard(cell);
        }
    }

    fn copy_to_clipboard(&mut self, content: String) {
        trace!("Cell content: {}", content);
        if self.clipboard.is_none() {
            self.clipboard = Clipboard::new()
                .map_err(|e| warn!("Clipboard is not available: {:?}", e))
                .ok();
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            self.set_status_message("Clipboard is not available!");
            return;
        };
        match clipboard.set_text(content) {
            Ok(_) => self.set_status_message("Copied cell content to clipboard."),
            Err(e) => {
                warn!("Error copying to clipboard: {:?}", e);
                self.set_status_message("Copying to clipboard failed!");
            }
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn update_uidata(&mut self) {
        let state = self.view.state();
        let headers = self.view.headers();
        let page_cells = self.view.current_page_cells();

        let show_record = self.modus == Modus::RECORD
            || (self.modus == Modus::POPUP && self.previous_modus == Modus::RECORD);
        let record = if show_record {
            page_cells
                .get(self.curser_row)
                .map(|cells| {
                    headers
                        .iter()
                        .zip(cells)
                        .map(|(h, c)| (h.to_string(), flatten(c)))
                        .collect()
                })
                .unwrap_or_default()
        } else {
            Vec::new()
        };

        self.uidata = UIData {
            name: self.name.clone(),
            status: self.status,
            headers: headers
                .iter()
                .skip(self.offset_column)
                .map(|h| h.to_string())
                .collect(),
            rows: page_cells
                .iter()
                .map(|cells| cells.iter().skip(self.offset_column).map(flatten).collect())
                .collect(),
            selected_row: self.curser_row,
            page: self.view.page_info(),
            listed_total: self.listed_total,
            search: state.global_filter,
            category: state.category.unwrap_or_else(|| ALL_CATEGORIES.to_string()),
            show_record,
            record,
            record_row: self.record_row,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            cmdinput: self.last_input.clone(),
            active_cmdinput: self.modus == Modus::CMDINPUT,
            status_message: self.status_message.clone(),
        };
    }
}
