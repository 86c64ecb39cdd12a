use ratatui::{
    Frame,
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState},
};

use crate::domain::PVConfig;
use crate::model::{Model, Status, UIData};
use crate::view::PageInfo;

pub const CMDLINE_HEIGH: u16 = 1;
pub const FILTERLINE_HEIGHT: u16 = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 1;
const POPUP_WIDTH: u16 = 64;
const POPUP_HEIGHT: u16 = 24;

#[derive(Debug)]
pub struct TableUI {
    max_column_width: usize,
}

// Terminal column of the cursor, wide characters take two cells
fn cursor_column(x: u16, prompt: &str, input: &str, cursor_pos: usize) -> u16 {
    let before_cursor: String = input.chars().take(cursor_pos).collect();
    let width = Span::raw(prompt).width() + Span::raw(before_cursor).width();
    x.saturating_add(u16::try_from(width).unwrap_or(u16::MAX))
}

fn position_text(page: &PageInfo, listed_total: Option<u64>) -> String {
    let listed = listed_total
        .map(|total| format!(" of {total} listed"))
        .unwrap_or_default();
    format!(
        "{}{} Page {} of {} {}{} | {}/{}{} ",
        if page.can_go_previous { "<<" } else { "  " },
        if page.can_go_previous { " <" } else { "  " },
        page.page_index + 1,
        page.page_count,
        if page.can_go_next { "> " } else { "  " },
        if page.can_go_next { ">>" } else { "  " },
        page.filtered_count,
        page.total_count,
        listed,
    )
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        return s.to_string();
    }
    if width < 3 {
        return s.chars().take(width).collect();
    }
    let mut reduced: String = s.chars().take(width - 3).collect();
    reduced.push_str("...");
    reduced
}

impl TableUI {
    pub fn new(config: &PVConfig) -> Self {
        Self {
            max_column_width: config.max_column_width,
        }
    }

    pub fn draw(&self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [filter_area, table_area, status_area] = Layout::vertical([
            Constraint::Length(FILTERLINE_HEIGHT),
            Constraint::Fill(1),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        self.draw_filterline(uidata, frame, filter_area);
        match uidata.status {
            Status::LOADING => {
                let loading = Paragraph::new("Loading ...")
                    .centered()
                    .block(Block::bordered().title(uidata.name.as_str()));
                frame.render_widget(loading, table_area);
            }
            _ if uidata.show_record => self.draw_record(uidata, frame, table_area),
            _ => self.draw_table(uidata, frame, table_area),
        }
        self.draw_statusline(uidata, frame, status_area);

        if uidata.show_popup {
            Self::draw_popup(uidata, frame);
        }
    }

    fn draw_filterline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prompt = "Search: ";
            let line = Line::from(vec![
                prompt.blue().bold(),
                Span::raw(uidata.cmdinput.input.as_str()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            frame.set_cursor_position((
                cursor_column(
                    area.x,
                    prompt,
                    &uidata.cmdinput.input,
                    uidata.cmdinput.cursor_pos,
                ),
                area.y,
            ));
        } else {
            let search = if uidata.search.is_empty() {
                "Search all columns...".dark_gray()
            } else {
                uidata.search.as_str().yellow()
            };
            let line = Line::from(vec![
                "Search: ".blue().bold(),
                search,
                "  Category: ".blue().bold(),
                uidata.category.as_str().yellow(),
            ]);
            frame.render_widget(Paragraph::new(line), area);
        }
    }

    fn column_widths(&self, uidata: &UIData) -> Vec<Constraint> {
        uidata
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let content = uidata
                    .rows
                    .iter()
                    .filter_map(|row| row.get(idx))
                    .map(|cell| cell.chars().count())
                    .max()
                    .unwrap_or(0);
                let width = std::cmp::max(header.chars().count(), content);
                Constraint::Length((std::cmp::min(width, self.max_column_width) + COLUMN_WIDTH_MARGIN) as u16)
            })
            .collect()
    }

    fn draw_table(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header = Row::new(
            uidata
                .headers
                .iter()
                .map(|h| Cell::from(truncate(h, self.max_column_width))),
        )
        .style(Style::default().add_modifier(Modifier::BOLD).fg(Color::Blue));

        let rows = uidata.rows.iter().map(|row| {
            Row::new(
                row.iter()
                    .map(|cell| Cell::from(truncate(cell, self.max_column_width))),
            )
        });

        let block = Block::default()
            .borders(Borders::TOP)
            .title(Line::from(uidata.name.as_str()).centered());
        let table = Table::new(rows, self.column_widths(uidata))
            .header(header)
            .block(block)
            .column_spacing(1)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));

        let mut state = TableState::default();
        if !uidata.rows.is_empty() {
            state.select(Some(uidata.selected_row));
        }
        frame.render_stateful_widget(table, area, &mut state);

        if uidata.rows.is_empty() {
            let [_, message_area, _] = Layout::vertical([
                Constraint::Fill(1),
                Constraint::Length(1),
                Constraint::Fill(1),
            ])
            .areas(area);
            frame.render_widget(Paragraph::new("No products").centered().dark_gray(), message_area);
        }
    }

    fn draw_record(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let header_width = uidata
            .record
            .iter()
            .map(|(h, _)| h.chars().count())
            .max()
            .unwrap_or(0) as u16;
        let rows = uidata.record.iter().map(|(h, v)| {
            Row::new(vec![
                Cell::from(h.as_str()).bold().blue(),
                Cell::from(v.as_str()),
            ])
        });
        let block = Block::default()
            .borders(Borders::TOP)
            .title(Line::from(format!("R[{}]", uidata.name)).centered());
        let table = Table::new(rows, [Constraint::Length(header_width), Constraint::Fill(1)])
            .block(block)
            .column_spacing(2)
            .row_highlight_style(Style::default().add_modifier(Modifier::REVERSED));
        let mut state = TableState::default().with_selected(Some(uidata.record_row));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_statusline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        let position = position_text(&uidata.page, uidata.listed_total);
        let [message_area, position_area] = Layout::horizontal([
            Constraint::Fill(1),
            Constraint::Length(u16::try_from(Span::raw(position.as_str()).width()).unwrap_or(u16::MAX)),
        ])
        .areas(area);

        let message = match uidata.status {
            Status::FAILED => uidata.status_message.as_str().red(),
            _ => uidata.status_message.as_str().into(),
        };
        frame.render_widget(Paragraph::new(Line::from(message)), message_area);
        frame.render_widget(Paragraph::new(Span::from(position).bold()), position_area);
    }

    fn draw_popup(uidata: &UIData, frame: &mut Frame) {
        let [area] = Layout::horizontal([Constraint::Length(POPUP_WIDTH)])
            .flex(Flex::Center)
            .areas(frame.area());
        let [area] = Layout::vertical([Constraint::Length(POPUP_HEIGHT)])
            .flex(Flex::Center)
            .areas(area);
        let popup = Paragraph::new(uidata.popup_message.as_str()).block(
            Block::bordered()
                .title(Line::from(" Help ").centered())
                .title_bottom(Line::from(" <Esc> close ").centered()),
        );
        frame.render_widget(Clear, area);
        frame.render_widget(popup, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_cells_are_truncated() {
        assert_eq!(truncate("Essence Mascara", 10), "Essence...");
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("crème brûlée", 8), "crème...");
        assert_eq!(truncate("abc", 2), "ab");
    }

    #[test]
    fn cursor_follows_display_width() {
        assert_eq!(cursor_column(0, "Search: ", "lamp", 4), 12);
        assert_eq!(cursor_column(2, "Search: ", "日本茶", 2), 14);
        assert_eq!(cursor_column(0, "Search: ", "crème", 5), 13);
        assert_eq!(cursor_column(u16::MAX - 1, "Search: ", "x", 1), u16::MAX);
    }

    #[test]
    fn status_line_shows_the_backend_total() {
        let page = PageInfo {
            page_index: 0,
            page_count: 3,
            can_go_next: true,
            can_go_previous: false,
            filtered_count: 25,
            total_count: 30,
        };
        assert_eq!(
            position_text(&page, None),
            "     Page 1 of 3 > >> | 25/30 "
        );
        assert_eq!(
            position_text(&page, Some(194)),
            "     Page 1 of 3 > >> | 25/30 of 194 listed "
        );
    }
}
