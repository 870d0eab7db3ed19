//! Source list

use super::ordering::{move_item, Direction, Identified};
use crate::capture::SourceKind;
use crate::utils::{StudioError, StudioResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: SourceKind,
}

impl Identified for Source {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default)]
pub struct SourceList {
    sources: Vec<Source>,
    selected: Option<String>,
}

impl SourceList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Source> {
        self.sources.iter().find(|s| s.id == id)
    }

    /// Append a source of `kind` and select it
    pub fn add(&mut self, kind: SourceKind) -> Source {
        let source = Source {
            id: Uuid::new_v4().to_string(),
            name: kind.display_name().to_string(),
            kind,
        };
        self.sources.push(source.clone());
        self.selected = Some(source.id.clone());
        source
    }

    /// Remove a source, clearing the selection if it was selected
    pub fn remove(&mut self, id: &str) -> Option<Source> {
        let index = self.sources.iter().position(|s| s.id == id)?;
        if self.selected.as_deref() == Some(id) {
            self.selected = None;
        }
        Some(self.sources.remove(index))
    }

    pub fn move_source(&mut self, id: &str, direction: Direction) -> StudioResult<bool> {
        move_item(&mut self.sources, id, direction)
            .ok_or_else(|| StudioError::SourceNotFound(id.to_string()))
    }

    pub fn select(&mut self, id: &str) -> StudioResult<()> {
        if self.get(id).is_none() {
            return Err(StudioError::SourceNotFound(id.to_string()));
        }
        self.selected = Some(id.to_string());
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}
