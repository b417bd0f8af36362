//! Serialized shape of a saved project. Field names stay camelCase so saved
//! documents read like the studio's JSON conventions.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSnapshot {
    pub id: String,
    pub name: String,
    pub registry: RegistrySnapshot,
    pub scene_manager: SceneManagerSnapshot,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrySnapshot {
    pub modules: Vec<ModuleSnapshot>,
}

/// Only identity and authored source are stored; compiled artifacts are
/// rebuilt on load.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleSnapshot {
    pub id: String,
    pub name: String,
    pub source: String,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneManagerSnapshot {
    #[serde(default)]
    pub default_scene_id: Option<String>,
    pub scenes: Vec<SceneSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneSnapshot {
    pub id: String,
    pub name: String,
    pub game_objects: Vec<GameObjectSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameObjectSnapshot {
    pub id: String,
    pub name: String,
    pub attachments: Vec<AttachmentSnapshot>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentSnapshot {
    pub uid: String,
    pub module_id: String,
}
