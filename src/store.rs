//! The template store: single owner of application state.
//!
//! Every mutating action follows the same sequence: replace the state,
//! notify subscribers, then persist the templates. Storage and network
//! failures are logged and swallowed so the UI keeps working in memory.
use std::{cell::RefCell, rc::Rc};

use log::{debug, error, info, trace};

use crate::{
    ApplicationState, Emitter, IdGenerator, KeyValueStorage, RemoteSource, Result, Subscription,
    Template, TemplateId, TemplatePatch, TmplError,
};

/// Default slot name for persisted templates.
pub const DEFAULT_STORAGE_KEY: &str = "messageTemplates";

struct StoreInner {
    state: RefCell<ApplicationState>,
    ids: RefCell<IdGenerator>,
    emitter: Emitter,
    storage: Box<dyn KeyValueStorage>,
    storage_key: String,
    remote: RefCell<RemoteSource>,
}

/// Handle to the shared store. Clones refer to the same state.
#[derive(Clone)]
pub struct TemplateStore {
    inner: Rc<StoreInner>,
}

impl TemplateStore {
    /// Creates a store with empty state, seeded from `storage` when a value is present.
    pub fn new(storage: impl KeyValueStorage + 'static, storage_key: impl Into<String>) -> Self {
        Self::with_state(ApplicationState::default(), storage, storage_key)
    }

    /// Creates a store starting from `state`, then loads persisted templates over it.
    pub fn with_state(
        state: ApplicationState,
        storage: impl KeyValueStorage + 'static,
        storage_key: impl Into<String>,
    ) -> Self {
        let mut ids = IdGenerator::new();
        for template in &state.templates {
            ids.observe(template.id);
        }

        let store = Self {
            inner: Rc::new(StoreInner {
                state: RefCell::new(state),
                ids: RefCell::new(ids),
                emitter: Emitter::new(),
                storage: Box::new(storage),
                storage_key: storage_key.into(),
                remote: RefCell::new(RemoteSource::default()),
            }),
        };
        store.load_from_storage();
        store
    }

    /// Replaces the client used by [`TemplateStore::load_templates_from_server`].
    pub fn set_remote(&self, remote: RemoteSource) {
        *self.inner.remote.borrow_mut() = remote;
    }

    pub fn storage_key(&self) -> &str {
        &self.inner.storage_key
    }

    /// Returns a snapshot of the current state
    pub fn get_state(&self) -> ApplicationState {
        self.inner.state.borrow().clone()
    }

    /// Returns the selected template, or `None` when nothing (or an unknown id) is selected
    pub fn get_selected_template(&self) -> Option<Template> {
        let state = self.inner.state.borrow();
        let selected = state.selected_template_id?;
        state.templates.iter().find(|t| t.id == selected).cloned()
    }

    /// Selects `id` without checking that it exists. Not persisted.
    pub fn select_template(&self, id: TemplateId) {
        debug!("Selecting template {}", id);
        self.inner.state.borrow_mut().selected_template_id = Some(id);
        self.notify();
    }

    /// Prepends a new template with empty content and selects it.
    ///
    /// The title is taken as-is; callers trim and reject empty input.
    pub fn add_template(&self, title: impl Into<String>) -> TemplateId {
        let id = {
            let state = self.inner.state.borrow();
            self.inner
                .ids
                .borrow_mut()
                .next_id(|id| state.templates.iter().any(|t| t.id == id))
        };
        let template = Template::new(id, title.into());
        debug!("Adding template {} ({})", id, template.title);

        {
            let mut state = self.inner.state.borrow_mut();
            let mut templates = Vec::with_capacity(state.templates.len() + 1);
            templates.push(template);
            templates.extend(state.templates.iter().cloned());
            state.templates = templates;
            state.selected_template_id = Some(id);
        }

        self.notify();
        self.save_to_storage();
        id
    }

    /// Shallow-merges `patch` into the template with `id`. Unknown ids change nothing
    /// but still notify and persist.
    pub fn update_template(&self, id: TemplateId, patch: TemplatePatch) {
        debug!("Updating template {}", id);
        {
            let mut state = self.inner.state.borrow_mut();
            let templates = state
                .templates
                .iter()
                .map(|template| {
                    let mut template = template.clone();
                    if template.id == id {
                        template.apply(&patch);
                    }
                    template
                })
                .collect();
            state.templates = templates;
        }

        self.notify();
        self.save_to_storage();
    }

    /// Removes the template with `id` and moves the selection to the new first template.
    pub fn delete_template(&self, id: TemplateId) {
        debug!("Deleting template {}", id);
        {
            let mut state = self.inner.state.borrow_mut();
            let templates: Vec<Template> = state
                .templates
                .iter()
                .filter(|template| template.id != id)
                .cloned()
                .collect();
            state.selected_template_id = templates.first().map(|t| t.id);
            state.templates = templates;
        }

        self.notify();
        self.save_to_storage();
    }

    /// Registers a listener invoked after every state change.
    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        self.inner.emitter.subscribe(listener)
    }

    /// Replaces the templates with the persisted ones, if any. Selection is kept.
    ///
    /// Read and parse failures are logged and leave the state untouched.
    pub fn load_from_storage(&self) {
        match self.read_storage() {
            Ok(Some(templates)) => {
                info!(
                    "Loaded {} templates from storage key '{}'",
                    templates.len(),
                    self.inner.storage_key
                );
                self.replace_templates(templates);
            }
            Ok(None) => debug!("No templates stored under '{}'", self.inner.storage_key),
            Err(e) => error!("{}", e),
        }
    }

    /// Fetches templates from `url` and replaces the current ones wholesale.
    ///
    /// Network and parse failures are logged and leave the state untouched.
    /// The loaded templates are not persisted until the next mutation or [`TemplateStore::flush`].
    /// Returns whether the templates were replaced.
    pub async fn load_templates_from_server(&self, url: &str) -> bool {
        let remote = self.inner.remote.borrow().clone();
        match remote.fetch_templates(url).await {
            Ok(templates) => {
                info!("Loaded {} templates from {}", templates.len(), url);
                self.replace_templates(templates);
                true
            }
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Persists the templates now, returning any failure to the caller.
    pub fn flush(&self) -> Result<()> {
        self.write_storage()
    }

    fn replace_templates(&self, templates: Vec<Template>) {
        {
            let mut ids = self.inner.ids.borrow_mut();
            for template in &templates {
                ids.observe(template.id);
            }
        }
        self.inner.state.borrow_mut().templates = templates;
        self.notify();
    }

    fn notify(&self) {
        self.inner.emitter.emit();
    }

    fn save_to_storage(&self) {
        if let Err(e) = self.write_storage() {
            error!("{}", e);
        }
    }

    fn read_storage(&self) -> Result<Option<Vec<Template>>> {
        let key = &self.inner.storage_key;
        let read_error = |message: String| TmplError::StorageRead {
            key: key.clone(),
            message,
        };

        let raw = self
            .inner
            .storage
            .get_item(key)
            .map_err(|e| read_error(e.to_string()))?;

        match raw {
            Some(raw) if raw.is_empty() => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| read_error(e.to_string())),
            None => Ok(None),
        }
    }

    fn write_storage(&self) -> Result<()> {
        let key = &self.inner.storage_key;
        let write_error = |message: String| TmplError::StorageWrite {
            key: key.clone(),
            message,
        };

        let json = serde_json::to_string(&self.inner.state.borrow().templates)
            .map_err(|e| write_error(e.to_string()))?;
        self.inner
            .storage
            .set_item(key, &json)
            .map_err(|e| write_error(e.to_string()))?;

        trace!("Saved templates under '{}'", key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::MemoryStorage;

    fn template(id: TemplateId, title: &str) -> Template {
        Template {
            id,
            title: title.to_string(),
            content: String::new(),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn store_with(templates: Vec<Template>, selected: Option<TemplateId>) -> TemplateStore {
        TemplateStore::with_state(
            ApplicationState {
                templates,
                selected_template_id: selected,
            },
            MemoryStorage::new(),
            DEFAULT_STORAGE_KEY,
        )
    }

    fn notifications(store: &TemplateStore) -> Rc<Cell<usize>> {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let _ = store.subscribe(move || c.set(c.get() + 1));
        count
    }

    #[test]
    fn select_accepts_unknown_id() {
        let store = store_with(vec![template(1, "A")], None);
        let count = notifications(&store);

        store.select_template(42);

        assert_eq!(store.get_state().selected_template_id, Some(42));
        assert_eq!(store.get_selected_template(), None);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn select_is_not_persisted() {
        let storage = MemoryStorage::new();
        let store = TemplateStore::new(storage.clone(), DEFAULT_STORAGE_KEY);
        store.select_template(1);
        assert_eq!(storage.get_item(DEFAULT_STORAGE_KEY).unwrap(), None);
    }

    #[test]
    fn add_accepts_empty_title() {
        let store = store_with(vec![], None);
        let id = store.add_template("");
        assert_eq!(store.get_selected_template().unwrap().id, id);
        assert_eq!(store.get_selected_template().unwrap().title, "");
    }

    #[test]
    fn update_can_replace_title() {
        let store = store_with(vec![template(1, "A")], Some(1));
        store.update_template(
            1,
            TemplatePatch {
                title: Some("B".to_string()),
                content: None,
            },
        );
        assert_eq!(store.get_state().templates[0].title, "B");
    }

    #[test]
    fn delete_of_unselected_template_still_rehomes() {
        let store = store_with(
            vec![template(3, "C"), template(2, "B"), template(1, "A")],
            Some(1),
        );
        store.delete_template(2);
        assert_eq!(store.get_state().selected_template_id, Some(3));
    }

    #[test]
    fn listener_can_query_and_mutate_during_notify() {
        let store = store_with(vec![], None);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let inner = store.clone();
        let log = Rc::clone(&seen);
        let _ = store.subscribe(move || {
            let state = inner.get_state();
            log.borrow_mut().push(state.templates.len());
            if state.templates.len() == 1 {
                inner.add_template("second");
            }
        });

        store.add_template("first");
        assert_eq!(*seen.borrow(), vec![1, 2]);
        assert_eq!(store.get_state().templates[0].title, "second");
    }

    #[test]
    fn ids_never_reuse_seeded_ids() {
        let store = store_with(vec![template(u64::MAX - 1, "far future")], None);
        let id = store.add_template("next");
        assert_eq!(id, u64::MAX);
    }

    #[test]
    fn empty_stored_value_reads_as_absent() {
        let store = TemplateStore::new(
            MemoryStorage::with_item(DEFAULT_STORAGE_KEY, ""),
            DEFAULT_STORAGE_KEY,
        );
        assert!(matches!(store.read_storage(), Ok(None)));
    }

    #[test]
    fn ids_stay_unique_after_reaching_the_maximum() {
        let store = store_with(vec![template(u64::MAX, "last possible")], None);
        let a = store.add_template("a");
        let b = store.add_template("b");

        let ids: Vec<TemplateId> = store.get_state().templates.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![b, a, u64::MAX]);
        assert_ne!(a, b);
        assert!(!ids[..2].contains(&u64::MAX));
    }
}
