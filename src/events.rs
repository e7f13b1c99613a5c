use crossterm::event::Event as CrosstermEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseButton;
use crossterm::event::MouseEvent;
use crossterm::event::MouseEventKind;

use crate::ScreenSize;
use crate::pattern::Preset;

/// Everything the user can ask the simulator to do
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Start,
    Pause,
    TogglePlay,

    /// Advance one generation by hand
    Step,
    Reset,
    Clear,
    Randomize,

    /// Nudge the speed by this many steps
    Speed(i8),

    /// Nudge the cell size by this many dots
    CellSize(i8),
    ToggleGaps,
    LoadPreset(Preset),

    /// Load the pattern given on the command line
    LoadFile,

    /// Toggle the cell under terminal character `(col, row)`
    ToggleAt {
        col: ScreenSize,
        row: ScreenSize,
    },
    Resize {
        cols: ScreenSize,
        rows: ScreenSize,
    },

    /// Exit the application
    Exit,
}

/// Converts a crossterm event into a simulator command
pub fn convert_event(event: CrosstermEvent) -> Option<Command> {
    match event {
        CrosstermEvent::Key(key_event) => convert_key(key_event),
        CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            ..
        }) => Some(Command::ToggleAt { col: column, row }),
        CrosstermEvent::Resize(cols, rows) => Some(Command::Resize { cols, rows }),
        _ => None,
    }
}

fn convert_key(key_event: KeyEvent) -> Option<Command> {
    // Windows reports releases as well
    if key_event.kind == KeyEventKind::Release {
        return None;
    }

    match key_event {
        KeyEvent {
            code: KeyCode::Char('c'),
            modifiers: KeyModifiers::CONTROL,
            ..
        } => Some(Command::Exit),
        KeyEvent { code, .. } => match code {
            KeyCode::Char('q') | KeyCode::Esc => Some(Command::Exit),
            KeyCode::Char(' ') => Some(Command::TogglePlay),
            KeyCode::Char('s') => Some(Command::Start),
            KeyCode::Char('p') => Some(Command::Pause),
            KeyCode::Char('n') | KeyCode::Enter => Some(Command::Step),
            KeyCode::Char('r') => Some(Command::Reset),
            KeyCode::Char('c') => Some(Command::Clear),
            KeyCode::Char('x') => Some(Command::Randomize),
            KeyCode::Char('+' | '=') => Some(Command::Speed(1)),
            KeyCode::Char('-') => Some(Command::Speed(-1)),
            KeyCode::Char(']') => Some(Command::CellSize(1)),
            KeyCode::Char('[') => Some(Command::CellSize(-1)),
            KeyCode::Char('g') => Some(Command::ToggleGaps),
            KeyCode::Char('f') => Some(Command::LoadFile),
            KeyCode::Char(n @ '1'..='9') => {
                let i = n as usize - '1' as usize;

                Preset::ALL.get(i).copied().map(Command::LoadPreset)
            }
            _ => None,
        },
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::Event;
    use crossterm::event::KeyCode;
    use crossterm::event::KeyEvent;
    use crossterm::event::KeyEventKind;
    use crossterm::event::KeyEventState;
    use crossterm::event::KeyModifiers;
    use crossterm::event::MouseButton;
    use crossterm::event::MouseEvent;
    use crossterm::event::MouseEventKind;

    use super::Command;
    use super::convert_event;
    use crate::pattern::Preset;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn mouse(kind: MouseEventKind) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column: 3,
            row: 7,
            modifiers: KeyModifiers::NONE,
        })
    }

    #[test]
    fn keys() {
        assert_eq!(convert_event(key(KeyCode::Char('q'))), Some(Command::Exit));
        assert_eq!(convert_event(key(KeyCode::Char(' '))), Some(Command::TogglePlay));
        assert_eq!(convert_event(key(KeyCode::Enter)), Some(Command::Step));
        assert_eq!(convert_event(key(KeyCode::Char('c'))), Some(Command::Clear));
        assert_eq!(convert_event(key(KeyCode::Char('-'))), Some(Command::Speed(-1)));
        assert_eq!(convert_event(key(KeyCode::Char('z'))), None);
    }

    #[test]
    fn ctrl_c_exits() {
        let event = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));

        assert_eq!(convert_event(event), Some(Command::Exit));
    }

    #[test]
    fn number_keys_pick_presets() {
        assert_eq!(
            convert_event(key(KeyCode::Char('1'))),
            Some(Command::LoadPreset(Preset::Glider))
        );
        assert_eq!(
            convert_event(key(KeyCode::Char('6'))),
            Some(Command::LoadPreset(Preset::GliderGun))
        );
        assert_eq!(convert_event(key(KeyCode::Char('7'))), None);
    }

    #[test]
    fn releases_are_ignored() {
        let event = Event::Key(KeyEvent::new_with_kind_and_state(
            KeyCode::Char('q'),
            KeyModifiers::NONE,
            KeyEventKind::Release,
            KeyEventState::NONE,
        ));

        assert_eq!(convert_event(event), None);
    }

    #[test]
    fn left_press_toggles() {
        assert_eq!(
            convert_event(mouse(MouseEventKind::Down(MouseButton::Left))),
            Some(Command::ToggleAt { col: 3, row: 7 })
        );
        assert_eq!(convert_event(mouse(MouseEventKind::Up(MouseButton::Left))), None);
        assert_eq!(convert_event(mouse(MouseEventKind::Moved)), None);
    }

    #[test]
    fn resize() {
        assert_eq!(
            convert_event(Event::Resize(80, 24)),
            Some(Command::Resize { cols: 80, rows: 24 })
        );
    }
}
