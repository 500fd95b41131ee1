//! Module trait for the screens of the UI

use crossterm::event::KeyEvent;

use super::Action;

/// Trait for UI modules that can handle input
pub trait Module {
    /// Handle keyboard input in normal mode
    /// Returns an Action describing what should happen
    fn handle_key(&mut self, key: KeyEvent) -> Action;

    /// Handle keyboard input while one of the module's forms is being edited
    ///
    /// Modules without forms ignore it.
    fn handle_form_key(&mut self, _key: KeyEvent) -> Action {
        Action::None
    }

    /// Requests to issue when the screen is refreshed
    fn refresh(&mut self) -> Vec<crate::infrastructure::runtime::Request>;
}
