use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use tracing::debug;

use crate::spec::form::{FormDefinition, FormError};

/// Supplies form definitions, loaded once per filling session.
pub trait FormSource {
    fn load(&self, form_id: &str) -> Result<FormDefinition, FormError>;
}

/// Fixed set of forms held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    forms: BTreeMap<String, FormDefinition>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_form(self, form: FormDefinition) -> Self {
        let mut forms = self.forms;
        forms.insert(form.id.clone(), form);
        Self { forms }
    }
}

impl FormSource for StaticSource {
    fn load(&self, form_id: &str) -> Result<FormDefinition, FormError> {
        self.forms
            .get(form_id)
            .cloned()
            .ok_or_else(|| FormError::UnknownForm(form_id.to_string()))
    }
}

/// Reads `<root>/<form_id>.json`.
#[derive(Debug, Clone)]
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FormSource for DirSource {
    fn load(&self, form_id: &str) -> Result<FormDefinition, FormError> {
        let valid_id = !form_id.is_empty()
            && form_id
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.'))
            && !form_id.starts_with('.');
        if !valid_id {
            return Err(FormError::UnknownForm(form_id.to_string()));
        }

        let path = self.root.join(format!("{form_id}.json"));
        if !path.is_file() {
            return Err(FormError::UnknownForm(form_id.to_string()));
        }
        debug!(path = %path.display(), "loading form definition");
        let contents = fs::read_to_string(&path)?;
        let form = FormDefinition::from_json(&contents)?;
        if form.id != form_id {
            return Err(FormError::UnknownForm(form_id.to_string()));
        }
        Ok(form)
    }
}
