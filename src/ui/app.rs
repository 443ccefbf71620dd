use std::io::stdout;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use tracing::{debug, info};
use tui_widgets::popup::PopupState;

use crate::config::{Config, UiColors};
use crate::contact::{Contact, DraftField};
use crate::controller::{ContactController, DeleteRequest, FormMode};
use crate::error::ContactError;

use super::draw;
use super::form::FormEditor;
use super::keys::matches_any;

/// Blocking message shown over the form; any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub lines: Vec<String>,
}

/// A section in the help modal (e.g., "List", "Form")
pub struct HelpSection {
    pub title: &'static str,
    pub entries: Vec<HelpEntry>,
}

/// A single help entry (action name + key bindings)
pub struct HelpEntry {
    pub action: &'static str,
    pub keys: String,
}

pub struct App<'a> {
    config: &'a Config,
    pub controller: ContactController,
    pub selected: usize,
    pub list_state: ListState,
    pub form: FormEditor,
    pub status: Option<String>,
    pub notice: Option<Notice>,
    /// Scroll offset of the help overlay; `None` while it is closed.
    pub help_scroll: Option<u16>,
    // Popup state for modal dialogs (tui-widgets popup)
    pub modal_popup: PopupState,
}

impl<'a> App<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            config,
            controller: ContactController::new(config.categories.clone()),
            selected: 0,
            list_state: ListState::default(),
            form: FormEditor::default(),
            status: None,
            notice: None,
            help_scroll: None,
            modal_popup: PopupState::default(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn event_loop<B>(&mut self, terminal: &mut Terminal<B>) -> Result<()>
    where
        B: ratatui::backend::Backend,
    {
        loop {
            draw::render(terminal, self)?;

            if event::poll(Duration::from_millis(250))? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        if self.handle_key(key)? {
                            info!(contacts = self.controller.contacts().len(), "quitting");
                            break;
                        }
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Route a key press. Returns `true` when the application should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        // Ctrl+C always quits (hardcoded for safety)
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
        {
            return Ok(true);
        }

        if self.help_scroll.is_some() {
            self.handle_help_key(key);
            return Ok(false);
        }

        if self.notice.is_some() {
            self.notice = None;
            return Ok(false);
        }

        if self.controller.pending_delete().is_some() {
            self.handle_confirm_key(key);
            return Ok(false);
        }

        if self.controller.is_form_open() {
            self.handle_form_key(key);
            return Ok(false);
        }

        Ok(self.handle_list_key(key))
    }

    // =========================================================================
    // List
    // =========================================================================

    fn handle_list_key(&mut self, key: KeyEvent) -> bool {
        let config = self.config;
        let global = &config.keys.global;
        let list = &config.keys.list;

        if matches_any(&key, &global.quit) {
            return true;
        }

        if matches_any(&key, &global.add) {
            self.controller.open_for_create();
            self.form.open(self.controller.draft(), self.controller.categories());
            return false;
        }

        if matches_any(&key, &global.help) {
            self.show_help();
            return false;
        }

        if matches_any(&key, &list.next) {
            self.move_selection(1);
        } else if matches_any(&key, &list.prev) {
            self.move_selection(-1);
        } else if matches_any(&key, &list.top) {
            self.select_index(0);
        } else if matches_any(&key, &list.bottom) {
            self.select_index(self.controller.contacts().len().saturating_sub(1));
        } else if matches_any(&key, &list.edit) {
            self.begin_edit();
        } else if matches_any(&key, &list.delete) {
            self.begin_delete();
        }

        false
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.controller.contacts().len();
        if len == 0 {
            return;
        }
        let index = (self.selected as isize + delta).clamp(0, len as isize - 1);
        self.select_index(index as usize);
    }

    fn select_index(&mut self, index: usize) {
        let len = self.controller.contacts().len();
        self.selected = if len == 0 { 0 } else { index.min(len - 1) };
        self.list_state
            .select(if len == 0 { None } else { Some(self.selected) });
    }

    fn begin_edit(&mut self) {
        if self.controller.contacts().is_empty() {
            self.set_status("Nothing to edit");
            return;
        }
        match self.controller.open_for_edit(self.selected) {
            Ok(_) => {
                self.form
                    .open(self.controller.draft(), self.controller.categories());
            }
            Err(err) => self.report_stale(err),
        }
    }

    fn begin_delete(&mut self) {
        if self.controller.contacts().is_empty() {
            self.set_status("Nothing to delete");
            return;
        }
        match self.controller.request_delete(self.selected) {
            Ok(_) => {
                self.modal_popup = PopupState::default();
            }
            Err(err) => self.report_stale(err),
        }
    }

    /// A row reference went out of date; fall back to a clamped selection.
    fn report_stale(&mut self, err: ContactError) {
        debug!(error = %err, "stale row reference");
        self.select_index(self.selected);
        self.set_status(format!("List changed, try again ({})", err));
    }

    // =========================================================================
    // Delete confirmation
    // =========================================================================

    fn handle_confirm_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.confirm;

        if matches_any(&key, &keys.cancel) {
            self.controller.decline_delete();
            self.set_status("Delete cancelled");
            return;
        }

        if matches_any(&key, &keys.confirm) {
            match self.controller.confirm_delete() {
                Ok(Some(contact)) => {
                    self.select_index(self.selected);
                    self.set_status(format!("Removed \"{}\"", contact.name));
                }
                Ok(None) => {}
                Err(err) => self.report_stale(err),
            }
        }
    }

    // =========================================================================
    // Form
    // =========================================================================

    fn handle_form_key(&mut self, key: KeyEvent) {
        let config = self.config;
        let keys = &config.keys.form;

        if matches_any(&key, &keys.cancel) {
            self.controller.cancel();
            self.form.close();
            self.set_status("Edit cancelled");
            return;
        }

        if matches_any(&key, &keys.save) {
            self.save_form();
            return;
        }

        if matches_any(&key, &keys.next_field) {
            self.form.focus_next();
            return;
        }

        if matches_any(&key, &keys.prev_field) {
            self.form.focus_prev();
            return;
        }

        if self.form.focus() == DraftField::Category {
            let delta = if matches_any(&key, &keys.category_next) {
                1
            } else if matches_any(&key, &keys.category_prev) {
                -1
            } else {
                return;
            };
            if let Some(name) = self
                .form
                .step_category(delta, self.controller.categories())
            {
                self.controller
                    .update_draft_field(DraftField::Category, name);
            }
            return;
        }

        if let Some((field, value)) = self.form.handle_text_key(key) {
            self.controller.update_draft_field(field, value);
        }
    }

    fn save_form(&mut self) {
        let mode = self.controller.form_mode();
        match self.controller.save() {
            Ok(id) => {
                self.form.close();
                if let Some(index) = self.controller.position(id) {
                    self.select_index(index);
                }
                let verb = match mode {
                    Some(FormMode::Edit(_)) => "Updated",
                    _ => "Added",
                };
                let name = self
                    .controller
                    .contact(id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                self.set_status(format!("{} \"{}\"", verb, name));
            }
            Err(ContactError::Validation { missing }) => {
                let fields = missing
                    .iter()
                    .map(|f| f.title())
                    .collect::<Vec<_>>()
                    .join(", ");
                self.show_notice(
                    "Error",
                    vec![
                        "Fill in all fields before saving.".to_string(),
                        format!("Missing: {}", fields),
                    ],
                );
            }
            Err(err) => {
                self.show_notice("Error", vec![err.to_string()]);
            }
        }
    }

    fn show_notice(&mut self, title: &str, lines: Vec<String>) {
        self.modal_popup = PopupState::default();
        self.notice = Some(Notice {
            title: title.to_string(),
            lines,
        });
    }

    // =========================================================================
    // Read access for drawing
    // =========================================================================

    pub fn contacts(&self) -> &[Contact] {
        self.controller.contacts()
    }

    pub fn pending_delete(&self) -> Option<&DeleteRequest> {
        self.controller.pending_delete()
    }

    pub fn ui_colors(&self) -> &UiColors {
        &self.config.ui.colors
    }

    pub fn phone_region(&self) -> Option<&str> {
        self.config.phone_region.as_deref()
    }

    fn set_status<S: Into<String>>(&mut self, message: S) {
        self.status = Some(message.into());
    }

    // =========================================================================
    // Help Modal
    // =========================================================================

    /// Generate help content from current keybindings configuration
    pub fn help_entries(&self) -> Vec<HelpSection> {
        let keys = &self.config.keys;
        vec![
            help_section(
                "Global",
                &[
                    ("Quit", keys.global.quit.as_slice()),
                    ("Add contact", keys.global.add.as_slice()),
                    ("Help", keys.global.help.as_slice()),
                ],
            ),
            help_section(
                "List",
                &[
                    ("Next", keys.list.next.as_slice()),
                    ("Previous", keys.list.prev.as_slice()),
                    ("First", keys.list.top.as_slice()),
                    ("Last", keys.list.bottom.as_slice()),
                    ("Edit contact", keys.list.edit.as_slice()),
                    ("Delete contact", keys.list.delete.as_slice()),
                ],
            ),
            help_section(
                "Form",
                &[
                    ("Next field", keys.form.next_field.as_slice()),
                    ("Previous field", keys.form.prev_field.as_slice()),
                    ("Save", keys.form.save.as_slice()),
                    ("Cancel", keys.form.cancel.as_slice()),
                    ("Next category", keys.form.category_next.as_slice()),
                    ("Previous category", keys.form.category_prev.as_slice()),
                ],
            ),
            help_section(
                "Confirm",
                &[
                    ("Confirm", keys.confirm.confirm.as_slice()),
                    ("Cancel", keys.confirm.cancel.as_slice()),
                ],
            ),
        ]
    }

    pub fn show_help(&mut self) {
        self.help_scroll = Some(0);
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        let Some(scroll) = self.help_scroll else {
            return;
        };
        // The renderer clamps the offset to the content height.
        self.help_scroll = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => None,
            KeyCode::Char('j') | KeyCode::Down => Some(scroll.saturating_add(1)),
            KeyCode::Char('k') | KeyCode::Up => Some(scroll.saturating_sub(1)),
            _ => Some(scroll),
        };
    }

    // =========================================================================
    // Footer hints
    // =========================================================================

    pub fn list_hint(&self) -> String {
        let keys = &self.config.keys;
        format!(
            "{}: add  {}: edit  {}: delete  {}/{}: move  {}: help  {}: quit",
            keys.global.add.join("/"),
            keys.list.edit.join("/"),
            keys.list.delete.join("/"),
            first_binding(&keys.list.next),
            first_binding(&keys.list.prev),
            first_binding(&keys.global.help),
            first_binding(&keys.global.quit),
        )
    }

    pub fn form_hint(&self) -> String {
        let form = &self.config.keys.form;
        let navigation = if self.form.focus() == DraftField::Category {
            format!(
                "{}/{}: choose category",
                first_binding(&form.category_prev),
                first_binding(&form.category_next)
            )
        } else {
            format!("{}: next field", first_binding(&form.next_field))
        };
        format!(
            "{}  {}: save  {}: cancel",
            navigation,
            form.save.join("/"),
            form.cancel.join("/")
        )
    }

    pub fn confirm_hint(&self) -> String {
        let confirm = &self.config.keys.confirm;
        format!(
            "{}: delete  {}: cancel",
            confirm.confirm.join("/"),
            confirm.cancel.join("/")
        )
    }
}

fn help_section(title: &'static str, entries: &[(&'static str, &[String])]) -> HelpSection {
    HelpSection {
        title,
        entries: entries
            .iter()
            .map(|&(action, keys)| HelpEntry {
                action,
                keys: keys.join(", "),
            })
            .collect(),
    }
}

fn first_binding(bindings: &[String]) -> &str {
    bindings.first().map(String::as_str).unwrap_or("")
}
