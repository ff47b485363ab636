//! Template list with the add input and the content editor.
use std::{
    cell::{Cell, RefCell},
    fmt::Write,
    rc::{Rc, Weak},
    time::Duration,
};

use console::style;
use log::{debug, trace};

use crate::{
    format_created_at, Debouncer, Subscription, Template, TemplateId, TemplatePatch, TemplateStore,
};

/// Editor bound to one template. `draft` is what the user has typed so far.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Editor {
    template_id: TemplateId,
    draft: String,
}

struct ListViewInner {
    store: TemplateStore,
    list_section: RefCell<String>,
    editor: RefCell<Option<Editor>>,
    renders: Cell<usize>,
    debouncer: Debouncer,
}

impl ListViewInner {
    fn render(&self) {
        let state = self.store.get_state();
        let mut out = String::new();
        let _ = writeln!(out, "{}", style("Message Templates").bold());
        let _ = writeln!(out, "New template title: (type a title and press Enter)");
        if state.templates.is_empty() {
            let _ = writeln!(out, "  (no templates yet)");
        }
        for template in &state.templates {
            let _ = writeln!(
                out,
                "{}",
                render_item(template, state.selected_template_id == Some(template.id))
            );
        }
        *self.list_section.borrow_mut() = out;

        let selected = self.store.get_selected_template();
        if self.editor_is_bound_to(selected.as_ref()) {
            trace!("Editor is bound to the selected template, keeping its draft");
            return;
        }

        *self.editor.borrow_mut() = selected.map(|template| Editor {
            template_id: template.id,
            draft: template.content,
        });
        self.renders.set(self.renders.get() + 1);
    }

    /// True when the editor on screen already belongs to the selected template,
    /// so rebuilding it would throw away the user's in-progress text.
    fn editor_is_bound_to(&self, selected: Option<&Template>) -> bool {
        match (self.editor.borrow().as_ref(), selected) {
            (Some(editor), Some(template)) => editor.template_id == template.id,
            _ => false,
        }
    }
}

fn render_item(template: &Template, selected: bool) -> String {
    let marker = if selected { ">" } else { " " };
    let title = if selected {
        style(&template.title).bold().to_string()
    } else {
        template.title.clone()
    };
    format!(
        "{} #{}  {}  {}",
        marker,
        template.id,
        title,
        style(format_created_at(&template.created_at)).dim()
    )
}

/// Renders the template list and forwards user intents to the store.
pub struct ListView {
    inner: Rc<ListViewInner>,
    subscription: Subscription,
}

impl ListView {
    /// Creates the view, subscribes it to `store` and renders once.
    ///
    /// Content edits are committed after `debounce` of inactivity.
    pub fn new(store: TemplateStore, debounce: Duration) -> Self {
        let inner = Rc::new(ListViewInner {
            store: store.clone(),
            list_section: RefCell::new(String::new()),
            editor: RefCell::new(None),
            renders: Cell::new(0),
            debouncer: Debouncer::new(debounce),
        });

        let weak: Weak<ListViewInner> = Rc::downgrade(&inner);
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

    /// Selects the clicked template.
    pub fn click(&self, id: TemplateId) {
        self.inner.store.select_template(id);
    }

    /// Handles Enter in the add input. Returns `true` when a template was added
    /// and the input should be cleared.
    pub fn submit_title(&self, input: &str) -> bool {
        let title = input.trim();
        if title.is_empty() {
            return false;
        }
        self.inner.store.add_template(title);
        true
    }

    /// Handles typing in the editor. The store update is debounced.
    pub fn edit_content(&self, content: &str) {
        let Some(selected) = self.inner.store.get_selected_template() else {
            debug!("Ignoring edit with no template selected");
            return;
        };

        if let Some(editor) = self.inner.editor.borrow_mut().as_mut() {
            if editor.template_id == selected.id {
                editor.draft = content.to_string();
            }
        }

        let store = self.inner.store.clone();
        let id = selected.id;
        let content = content.to_string();
        self.inner
            .debouncer
            .schedule(move || store.update_template(id, TemplatePatch::content(content)));
    }

    /// Whether a content edit is waiting for the debounce delay.
    pub fn has_pending_edit(&self) -> bool {
        self.inner.debouncer.is_pending()
    }

    /// Waits until any pending content edit has reached the store.
    pub async fn commit_pending(&self) {
        self.inner.debouncer.settle().await;
    }

    /// The id of the template the editor is bound to.
    pub fn editing(&self) -> Option<TemplateId> {
        self.inner.editor.borrow().as_ref().map(|e| e.template_id)
    }

    /// Number of renders that rebuilt the editor from the store.
    pub fn render_count(&self) -> usize {
        self.inner.renders.get()
    }

    /// Current screen contents: the list followed by the live editor.
    pub fn output(&self) -> String {
        let mut out = self.inner.list_section.borrow().clone();
        if let Some(editor) = self.inner.editor.borrow().as_ref() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "{}",
                style(format!("Message content (#{})", editor.template_id)).bold()
            );
            if editor.draft.is_empty() {
                let _ = writeln!(out, "{}", style("Type the message content...").dim());
            } else {
                let _ = writeln!(out, "{}", editor.draft);
            }
        }
        out
    }
}

impl Drop for ListView {
    fn drop(&mut self) {
        self.subscription.unsubscribe();
    }
}
