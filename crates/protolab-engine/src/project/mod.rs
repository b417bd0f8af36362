//! Project document: a named engine plus JSON save/load. Snapshots capture
//! identity and configuration only; live run state is never persisted.

mod snapshot;

use uuid::Uuid;

use crate::compile::CompileMachine;
use crate::core::engine::GameEngine;
use crate::core::prototype::PrototypeGameModule;
use crate::error::{StudioError, StudioResult};
use snapshot::{
    AttachmentSnapshot, GameObjectSnapshot, ModuleSnapshot, ProjectSnapshot, RegistrySnapshot,
    SceneManagerSnapshot, SceneSnapshot,
};

pub struct Project {
    id: String,
    name: String,
    engine: GameEngine,
}

impl Project {
    pub fn new(name: &str, compiler: Box<dyn CompileMachine>) -> StudioResult<Self> {
        let mut engine = GameEngine::new(compiler);
        engine.set_edit_mode(true)?;
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            engine,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut GameEngine {
        &mut self.engine
    }

    /// Seed a fresh project with one empty default scene.
    pub fn generate_empty_project(&mut self) -> StudioResult<()> {
        let scene_id = self
            .engine
            .scene_manager_mut()
            .new_scene("New Scene")?
            .id()
            .to_string();
        self.engine
            .scene_manager_mut()
            .set_default_scene_by_id(&scene_id)
    }

    pub fn save(&self) -> StudioResult<String> {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| StudioError::SnapshotInvalid(e.to_string()))
    }

    /// Modules are re-registered before any scene is reconstructed; an
    /// attachment referencing an unknown module id fails with
    /// `ModuleNotFound` rather than being silently dropped.
    pub fn load(json: &str, compiler: Box<dyn CompileMachine>) -> StudioResult<Self> {
        let snapshot: ProjectSnapshot =
            serde_json::from_str(json).map_err(|e| StudioError::SnapshotInvalid(e.to_string()))?;

        let mut engine = GameEngine::new(compiler);
        engine.set_edit_mode(true)?;

        for module in &snapshot.registry.modules {
            let mut prototype = PrototypeGameModule::with_id(&module.id, &module.name);
            prototype.set_origin_source(&module.source)?;
            engine
                .registry_mut()
                .register_by_module(prototype.into_shared())?;
        }

        for scene in &snapshot.scene_manager.scenes {
            engine
                .scene_manager_mut()
                .new_scene_with_id(&scene.name, &scene.id)?;
            for object in &scene.game_objects {
                let module_refs: Vec<_> = object
                    .attachments
                    .iter()
                    .map(|a| {
                        engine
                            .registry()
                            .get_prototype_game_module_by_id(&a.module_id)
                            .map(|m| (a.uid.clone(), m))
                    })
                    .collect::<StudioResult<_>>()?;

                let manager = engine
                    .scene_manager_mut()
                    .get_scene_by_id_mut(&scene.id)?
                    .game_object_manager_mut();
                let game_object = manager.create_game_object_with_id(&object.name, &object.id)?;
                for (uid, module) in module_refs {
                    game_object.add_prototype_gm_with_uid(&uid, module);
                }
            }
        }

        if let Some(default_id) = &snapshot.scene_manager.default_scene_id {
            engine
                .scene_manager_mut()
                .set_default_scene_by_id(default_id)?;
        }

        Ok(Self {
            id: snapshot.id,
            name: snapshot.name,
            engine,
        })
    }

    fn snapshot(&self) -> ProjectSnapshot {
        let registry = RegistrySnapshot {
            modules: self
                .engine
                .registry()
                .prototype_game_modules()
                .iter()
                .map(|m| {
                    let m = m.borrow();
                    ModuleSnapshot {
                        id: m.id().to_string(),
                        name: m.name().to_string(),
                        source: m.origin_source().to_string(),
                    }
                })
                .collect(),
        };

        let scene_manager = SceneManagerSnapshot {
            default_scene_id: self
                .engine
                .scene_manager()
                .default_scene_id()
                .map(str::to_string),
            scenes: self
                .engine
                .scene_manager()
                .scenes()
                .iter()
                .map(|scene| SceneSnapshot {
                    id: scene.id().to_string(),
                    name: scene.name().to_string(),
                    game_objects: scene
                        .game_object_manager()
                        .game_objects()
                        .iter()
                        .map(|go| GameObjectSnapshot {
                            id: go.id().to_string(),
                            name: go.name().to_string(),
                            attachments: go
                                .prototype_game_modules()
                                .iter()
                                .map(|a| AttachmentSnapshot {
                                    uid: a.uid.clone(),
                                    module_id: a.module.borrow().id().to_string(),
                                })
                                .collect(),
                        })
                        .collect(),
                })
                .collect(),
        };

        ProjectSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            registry,
            scene_manager,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn sample_project() -> (Project, String, String) {
        let mut project =
            Project::new("Sample", Box::new(testing::native_compiler())).unwrap();
        project.generate_empty_project().unwrap();

        project
            .engine_mut()
            .registry_mut()
            .register_by_source("Counter", &testing::counter_source())
            .unwrap();
        let module = project
            .engine()
            .registry()
            .get_prototype_game_module_by_name("Counter")
            .unwrap();

        let scene_id = project
            .engine()
            .scene_manager()
            .default_scene_id()
            .unwrap()
            .to_string();
        let uid = {
            let manager = project
                .engine_mut()
                .scene_manager_mut()
                .get_scene_by_id_mut(&scene_id)
                .unwrap()
                .game_object_manager_mut();
            let go = manager.create_game_object("Player");
            go.add_prototype_gm(module).uid
        };
        (project, scene_id, uid)
    }

    #[test]
    fn empty_project_has_one_default_scene() {
        let mut project =
            Project::new("Empty", Box::new(testing::native_compiler())).unwrap();
        project.generate_empty_project().unwrap();

        let manager = project.engine().scene_manager();
        assert_eq!(manager.scenes().len(), 1);
        assert_eq!(manager.default_scene_id(), Some(manager.scenes()[0].id()));
    }

    #[test]
    fn snapshot_round_trip_restores_identity() {
        let (project, scene_id, uid) = sample_project();
        let json = project.save().unwrap();

        let restored = Project::load(&json, Box::new(testing::native_compiler())).unwrap();
        assert_eq!(restored.id(), project.id());
        assert_eq!(restored.name(), "Sample");

        let registry = restored.engine().registry();
        let module = registry.get_prototype_game_module_by_name("Counter").unwrap();
        assert!(module.borrow().is_compiled());

        let manager = restored.engine().scene_manager();
        assert_eq!(manager.default_scene_id(), Some(scene_id.as_str()));
        let scene = manager.get_scene_by_id(&scene_id).unwrap();
        let objects = scene.game_object_manager().game_objects();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].name(), "Player");
        assert_eq!(objects[0].prototype_game_modules()[0].uid, uid);
    }

    #[test]
    fn restored_project_runs() {
        let (project, scene_id, _) = sample_project();
        let json = project.save().unwrap();

        let mut restored = Project::load(&json, Box::new(testing::native_compiler())).unwrap();
        restored.engine_mut().start(Some(&scene_id)).unwrap();
        restored.engine_mut().tick(0.016).unwrap();
    }

    #[test]
    fn load_rejects_attachment_to_unknown_module() {
        let (project, _, _) = sample_project();
        let mut json = project.save().unwrap();
        json = json.replace("\"modules\": [", "\"modules\": [],\n\"unused\": [");

        // The module list is now empty while an attachment still references it.
        let result = Project::load(&json, Box::new(testing::native_compiler()));
        assert_eq!(result.err(), Some(StudioError::ModuleNotFound));
    }

    #[test]
    fn load_rejects_malformed_json() {
        let result = Project::load("{ not json", Box::new(testing::native_compiler()));
        assert!(matches!(result, Err(StudioError::SnapshotInvalid(_))));
    }
}
