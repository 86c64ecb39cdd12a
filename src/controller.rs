use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, PVConfig, PVError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &PVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, PVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            if model.raw_keyevents() {
                return Ok(Some(Message::RawKey(key)));
            }
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(Message::Quit),
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char('j'), _) | (KeyCode::Down, _) => Some(Message::MoveDown),
            (KeyCode::Char('k'), _) | (KeyCode::Up, _) => Some(Message::MoveUp),
            (KeyCode::Char('h'), _) | (KeyCode::Left, _) => Some(Message::MoveLeft),
            (KeyCode::Char('l'), _) | (KeyCode::Right, _) => Some(Message::MoveRight),
            (KeyCode::Char('n'), _) | (KeyCode::PageDown, _) => Some(Message::NextPage),
            (KeyCode::Char('p'), _) | (KeyCode::PageUp, _) => Some(Message::PreviousPage),
            (KeyCode::Char('g'), _) | (KeyCode::Home, _) => Some(Message::FirstPage),
            (KeyCode::Char('G'), _) | (KeyCode::End, _) => Some(Message::LastPage),
            (KeyCode::Char('c'), _) => Some(Message::NextCategory),
            (KeyCode::Char('C'), _) => Some(Message::PreviousCategory),
            (KeyCode::Char('x'), _) => Some(Message::ClearFilters),
            (KeyCode::Char('/'), _) => Some(Message::EnterSearch),
            (KeyCode::Char('y'), _) => Some(Message::CopyCell),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEvent;

    fn map(code: KeyCode, modifiers: KeyModifiers) -> Option<Message> {
        let controller = Controller::new(&PVConfig::default());
        controller.handle_key(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn keys_map_to_messages() {
        assert_eq!(map(KeyCode::Char('q'), KeyModifiers::NONE), Some(Message::Quit));
        assert_eq!(map(KeyCode::Char('c'), KeyModifiers::CONTROL), Some(Message::Quit));
        assert_eq!(map(KeyCode::Char('c'), KeyModifiers::NONE), Some(Message::NextCategory));
        assert_eq!(map(KeyCode::Char('C'), KeyModifiers::SHIFT), Some(Message::PreviousCategory));
        assert_eq!(map(KeyCode::PageDown, KeyModifiers::NONE), Some(Message::NextPage));
        assert_eq!(map(KeyCode::Char('/'), KeyModifiers::NONE), Some(Message::EnterSearch));
        assert_eq!(map(KeyCode::Char('z'), KeyModifiers::NONE), None);
    }
}
