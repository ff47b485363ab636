//! Read-only phone-style preview of the selected template.
use std::{
    cell::{Cell, RefCell},
    fmt::Write,
    rc::{Rc, Weak},
};

use chrono::Local;
use console::{pad_str, style, Alignment};

use crate::{format_content, wrap_line, Subscription, TemplateStore};

/// Inner width of the phone screen, in terminal columns.
pub const PHONE_WIDTH: usize = 32;

/// Minimum number of rows on the phone screen.
const SCREEN_ROWS: usize = 12;

const NO_SELECTION_TITLE: &str = "No template selected";
const NO_SELECTION_HINT: &str = "Pick a template from the list";

struct PreviewInner {
    store: TemplateStore,
    width: usize,
    output: RefCell<String>,
    renders: Cell<usize>,
}

impl PreviewInner {
    fn render(&self) {
        let body: Vec<String> = match self.store.get_selected_template() {
            Some(template) => format_content(&template.content)
                .iter()
                .flat_map(|line| wrap_line(line, self.width))
                .collect(),
            None => vec![
                String::new(),
                NO_SELECTION_TITLE.to_string(),
                NO_SELECTION_HINT.to_string(),
            ],
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", style("Preview").bold());
        out.push_str(&self.phone_frame(&body));

        *self.output.borrow_mut() = out;
        self.renders.set(self.renders.get() + 1);
    }

    fn phone_frame(&self, body: &[String]) -> String {
        let width = self.width;
        let clock = Local::now().format("%H:%M").to_string();
        let row = |text: &str, align: Alignment| {
            format!("│ {} │\n", pad_str(text, width, align, Some("…")))
        };

        let mut frame = format!("╭{}╮\n", "─".repeat(width + 2));
        frame.push_str(&row(&clock, Alignment::Center));
        frame.push_str(&format!("├{}┤\n", "─".repeat(width + 2)));
        for line in body {
            frame.push_str(&row(line, Alignment::Left));
        }
        for _ in body.len()..SCREEN_ROWS {
            frame.push_str(&row("", Alignment::Left));
        }
        frame.push_str(&format!("╰{}╯\n", "─".repeat(width + 2)));
        frame
    }
}

/// Re-renders the selected template's content inside a phone frame on every change.
pub struct PreviewView {
    inner: Rc<PreviewInner>,
    subscription: Subscription,
}

impl PreviewView {
    /// Creates the view, sized to fit the terminal, and renders once.
    pub fn new(store: TemplateStore) -> Self {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);
        Self::with_width(store, PHONE_WIDTH.min(term_width.saturating_sub(4)).max(8))
    }

    /// Creates the view with an explicit screen width.
    pub fn with_width(store: TemplateStore, width: usize) -> Self {
        let inner = Rc::new(PreviewInner {
            store: store.clone(),
            width,
            output: RefCell::new(String::new()),
            renders: Cell::new(0),
        });

        let weak: Weak<PreviewInner> = Rc::downgrade(&inner);
        let subscription = store.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.render();
            }
        });

        inner.render();
        Self {
            inner,
            subscription,
        }
    }

    pub fn output(&self) -> String {
        self.inner.output.borrow().clone()
    }

    pub fn render_count(&self) -> usize {
        self.inner.renders.get()
    }
}

impl Drop for PreviewView {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MemoryStorage, TemplatePatch, DEFAULT_STORAGE_KEY};

    fn store() -> TemplateStore {
        TemplateStore::new(MemoryStorage::new(), DEFAULT_STORAGE_KEY)
    }

    #[test]
    fn shows_placeholder_without_selection() {
        let view = PreviewView::with_width(store(), PHONE_WIDTH);
        assert!(view.output().contains(NO_SELECTION_TITLE));
        assert!(view.output().contains(NO_SELECTION_HINT));
    }

    #[test]
    fn shows_placeholder_for_dangling_selection() {
        let store = store();
        let view = PreviewView::with_width(store.clone(), PHONE_WIDTH);
        store.add_template("A");
        store.select_template(12345);
        assert!(view.output().contains(NO_SELECTION_TITLE));
    }

    #[test]
    fn rerenders_on_every_change_with_trimmed_lines() {
        let store = store();
        let view = PreviewView::with_width(store.clone(), PHONE_WIDTH);
        let id = store.add_template("Greeting");
        store.update_template(id, TemplatePatch::content("   Hello\n\t  there"));

        let output = view.output();
        assert!(output.contains("│ Hello "));
        assert!(output.contains("│ there "));
        assert!(!output.contains(NO_SELECTION_TITLE));
        assert_eq!(view.render_count(), 3);
    }

    #[test]
    fn frame_lines_have_equal_width() {
        let store = store();
        let view = PreviewView::with_width(store.clone(), 10);
        let id = store.add_template("Long");
        store.update_template(id, TemplatePatch::content("a line much longer than ten"));

        let widths: Vec<usize> = view
            .output()
            .lines()
            .skip(1)
            .map(console::measure_text_width)
            .collect();
        assert!(widths.iter().all(|w| *w == 14));
        assert!(view.output().contains("│ a line muc │"));
    }
}
