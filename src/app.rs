use chrono::{DateTime, Local};
use ratatui::widgets::ListState;

use crate::guidance::Backend;
use crate::preset;
use crate::toast::{Toast, TOAST_TICKS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Presets,
    Input,
    Conversation,
}

/// One exchanged message. Immutable once appended to the conversation.
#[derive(Debug, Clone)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Session state
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub selected_preset: Option<String>,

    // Preset sidebar
    pub preset_state: ListState,

    // Conversation scroll state
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Notification state (most recent wins)
    pub active_toast: Option<Toast>,
    toast_ticks: u8,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Guidance request in flight, at most one
    pub guidance_task: Option<tokio::task::JoinHandle<anyhow::Result<String>>>,
    pub backend: Backend,
}

impl App {
    pub fn new(backend: Backend) -> Self {
        let mut preset_state = ListState::default();
        preset_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            focus: FocusPane::Input,

            input: String::new(),
            input_cursor: 0,
            messages: Vec::new(),
            is_loading: false,
            selected_preset: None,

            preset_state,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            active_toast: None,
            toast_ticks: 0,

            animation_frame: 0,

            guidance_task: None,
            backend,
        }
    }

    // ── Preset selector ──────────────────────────────────────────

    pub fn preset_nav_down(&mut self) {
        let len = preset::catalog().len();
        if len > 0 {
            let i = self.preset_state.selected().unwrap_or(0);
            self.preset_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn preset_nav_up(&mut self) {
        let i = self.preset_state.selected().unwrap_or(0);
        self.preset_state.select(Some(i.saturating_sub(1)));
    }

    /// Apply the highlighted preset: its label replaces the input, keeping any
    /// prior text as additional symptoms.
    pub fn select_highlighted_preset(&mut self) {
        if let Some(i) = self.preset_state.selected() {
            if let Some(p) = preset::catalog().get(i) {
                self.select_preset(p.label);
            }
        }
    }

    pub fn select_preset(&mut self, label: &str) {
        self.input = preset::apply_label(label, &self.input);
        self.input_cursor = self.input.chars().count();
        self.selected_preset = Some(label.to_string());
    }

    // ── Submission controller ────────────────────────────────────

    /// Validate and accept a submission. On success the user message is
    /// appended, the loading flag goes up, and the conversation so far is
    /// returned for the guidance request. Returns None when rejected: while a
    /// request is in flight (submit is disabled) or when the input is blank
    /// (validation toast, no state change).
    pub fn begin_submit(&mut self) -> Option<Vec<Message>> {
        if self.is_loading {
            return None;
        }

        if self.input.trim().is_empty() {
            self.raise_toast(Toast::destructive("Please describe your symptoms"));
            return None;
        }

        self.messages.push(Message {
            role: Role::User,
            content: self.input.clone(),
            timestamp: Local::now(),
        });
        self.is_loading = true;
        self.input_mode = InputMode::Normal;
        self.scroll_chat_to_bottom();

        Some(self.messages.clone())
    }

    /// Land the guidance result. Success appends the assistant message and
    /// clears the input; failure raises a toast and leaves the input intact
    /// so the user can resubmit. Either way the loading flag drops.
    pub fn apply_guidance(&mut self, result: anyhow::Result<String>) {
        self.is_loading = false;

        match result {
            Ok(guidance) => {
                self.messages.push(Message {
                    role: Role::Assistant,
                    content: guidance,
                    timestamp: Local::now(),
                });
                self.input.clear();
                self.input_cursor = 0;
                self.scroll_chat_to_bottom();
            }
            Err(e) => {
                tracing::error!("guidance request failed: {e:#}");
                self.raise_toast(
                    Toast::destructive("Error getting response").with_description("Please try again"),
                );
            }
        }
    }

    // ── Notification channel ─────────────────────────────────────

    pub fn raise_toast(&mut self, toast: Toast) {
        self.active_toast = Some(toast);
        self.toast_ticks = TOAST_TICKS;
    }

    // ── Ticking ──────────────────────────────────────────────────

    /// Advance the loading animation and expire the active toast.
    pub fn tick(&mut self) {
        if self.is_loading {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }

        if self.active_toast.is_some() {
            self.toast_ticks = self.toast_ticks.saturating_sub(1);
            if self.toast_ticks == 0 {
                self.active_toast = None;
            }
        }
    }

    // ── Conversation scrolling ───────────────────────────────────

    pub fn scroll_chat_down(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_add(1);
    }

    pub fn scroll_chat_up(&mut self) {
        self.chat_scroll = self.chat_scroll.saturating_sub(1);
    }

    /// Scroll so the newest message (or the thinking indicator) is visible.
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in &self.messages {
            total_lines += 1; // Role line ("You" / "Assistant" + time)
            for line in msg.content.lines() {
                // Character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += ((char_count / wrap_width) + 1) as u16;
                }
            }
            total_lines += 1; // Blank line after message
        }

        // Room for the "Thinking..." indicator
        total_lines += 2;

        let visible_height = if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        };

        if total_lines > visible_height {
            self.chat_scroll = total_lines.saturating_sub(visible_height);
        }
    }
}
