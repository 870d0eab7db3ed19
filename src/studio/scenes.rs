//! Scene list

use super::ordering::{move_item, Direction, Identified};
use super::profile::DeletePolicy;
use crate::utils::{StudioError, StudioResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_SCENE_ID: &str = "default";
pub const DEFAULT_SCENE_NAME: &str = "Default Scene";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub id: String,
    pub name: String,
}

impl Identified for Scene {
    fn id(&self) -> &str {
        &self.id
    }
}

fn validate_name(name: &str) -> StudioResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StudioError::EmptyName);
    }
    Ok(trimmed.to_string())
}

/// Ordered scenes plus the current selection
#[derive(Debug, Clone)]
pub struct SceneList {
    scenes: Vec<Scene>,
    selected: Option<String>,
    policy: DeletePolicy,
}

impl SceneList {
    /// A list holding only the default scene, selected
    pub fn new(policy: DeletePolicy) -> Self {
        Self {
            scenes: vec![Scene {
                id: DEFAULT_SCENE_ID.to_string(),
                name: DEFAULT_SCENE_NAME.to_string(),
            }],
            selected: Some(DEFAULT_SCENE_ID.to_string()),
            policy,
        }
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    fn find(&self, id: &str) -> StudioResult<&Scene> {
        self.scenes
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| StudioError::SceneNotFound(id.to_string()))
    }

    pub fn add(&mut self, name: &str) -> StudioResult<Scene> {
        let scene = Scene {
            id: Uuid::new_v4().to_string(),
            name: validate_name(name)?,
        };
        self.scenes.push(scene.clone());
        Ok(scene)
    }

    /// Remove a scene, moving the selection to the first remaining scene
    /// if the removed one was selected
    pub fn delete(&mut self, id: &str) -> StudioResult<Scene> {
        if id == DEFAULT_SCENE_ID && self.policy == DeletePolicy::ProtectDefault {
            return Err(StudioError::DefaultSceneProtected);
        }

        let index = self
            .scenes
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| StudioError::SceneNotFound(id.to_string()))?;
        let removed = self.scenes.remove(index);

        if self.selected.as_deref() == Some(id) {
            self.selected = self.scenes.first().map(|s| s.id.clone());
        }
        Ok(removed)
    }

    pub fn duplicate(&mut self, id: &str) -> StudioResult<Scene> {
        let copy = Scene {
            id: Uuid::new_v4().to_string(),
            name: format!("{} (copy)", self.find(id)?.name),
        };
        self.scenes.push(copy.clone());
        Ok(copy)
    }

    pub fn rename(&mut self, id: &str, name: &str) -> StudioResult<Scene> {
        let name = validate_name(name)?;
        let scene = self
            .scenes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or_else(|| StudioError::SceneNotFound(id.to_string()))?;
        scene.name = name;
        Ok(scene.clone())
    }

    /// Returns whether the scene actually moved
    pub fn move_scene(&mut self, id: &str, direction: Direction) -> StudioResult<bool> {
        move_item(&mut self.scenes, id, direction)
            .ok_or_else(|| StudioError::SceneNotFound(id.to_string()))
    }

    pub fn select(&mut self, id: &str) -> StudioResult<()> {
        self.find(id)?;
        self.selected = Some(id.to_string());
        Ok(())
    }
}
