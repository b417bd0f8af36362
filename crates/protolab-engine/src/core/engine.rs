//! Top-level driver tying the module registry to the scene state machine.
//! Owns the run/edit flags consulted by the tick loop.

use crate::compile::CompileMachine;
use crate::core::registry::GameModuleRegistry;
use crate::core::scene::SceneManager;
use crate::error::{StudioError, StudioResult};

pub struct GameEngine {
    running: bool,
    editing: bool,
    scene_manager: SceneManager,
    registry: GameModuleRegistry,
}

impl GameEngine {
    pub fn new(compiler: Box<dyn CompileMachine>) -> Self {
        Self {
            running: false,
            editing: false,
            scene_manager: SceneManager::new(),
            registry: GameModuleRegistry::new(compiler),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn scene_manager(&self) -> &SceneManager {
        &self.scene_manager
    }

    pub fn scene_manager_mut(&mut self) -> &mut SceneManager {
        &mut self.scene_manager
    }

    pub fn registry(&self) -> &GameModuleRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GameModuleRegistry {
        &mut self.registry
    }

    pub fn start(&mut self, scene_id: Option<&str>) -> StudioResult<()> {
        if self.running {
            return Err(StudioError::AlreadyRunning);
        }
        self.scene_manager.start_scene(scene_id, &self.registry)?;
        self.running = true;
        log::info!("engine started");
        Ok(())
    }

    /// Pause: the scene stays current, the tick loop just stops updating.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn finalize(&mut self) -> StudioResult<()> {
        if self.running {
            self.running = false;
            self.scene_manager.finish_current_scene()?;
        }
        Ok(())
    }

    /// Edit mode keeps rendering but suspends update ticks. Toggling it
    /// restarts the current scene so live state matches the new mode.
    pub fn set_edit_mode(&mut self, editing: bool) -> StudioResult<()> {
        self.editing = editing;
        if self.scene_manager.current_scene_id().is_some() {
            self.scene_manager.start_scene(None, &self.registry)?;
        }
        Ok(())
    }

    /// One render-loop iteration.
    pub fn tick(&mut self, delta_time: f64) -> StudioResult<()> {
        if !self.running {
            return Ok(());
        }
        self.scene_manager.scene_render()?;
        if !self.editing {
            self.scene_manager.scene_update(delta_time)?;
        }
        Ok(())
    }

    /// Registry removal plus attachment stripping across every scene, so no
    /// game object keeps a dangling reference to the dropped module.
    pub fn remove_game_module_by_id(&mut self, id: &str) {
        if let Some(module) = self.registry.remove_game_module_by_id(id) {
            self.scene_manager
                .remove_attachments_of_module(module.borrow().id());
        }
    }

    pub fn remove_game_module_by_name(&mut self, name: &str) {
        if let Some(module) = self.registry.remove_game_module_by_name(name) {
            self.scene_manager
                .remove_attachments_of_module(module.borrow().id());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    fn engine_with_scene() -> (GameEngine, String) {
        let mut engine = GameEngine::new(Box::new(testing::native_compiler()));
        engine
            .registry_mut()
            .register_by_source("Counter", &testing::counter_source())
            .unwrap();
        let id = engine
            .scene_manager_mut()
            .new_scene("Main")
            .unwrap()
            .id()
            .to_string();
        (engine, id)
    }

    #[test]
    fn double_start_rejected() {
        let (mut engine, scene) = engine_with_scene();
        engine.start(Some(&scene)).unwrap();
        assert_eq!(engine.start(Some(&scene)).err(), Some(StudioError::AlreadyRunning));
    }

    #[test]
    fn start_without_target_fails() {
        let mut engine = GameEngine::new(Box::new(testing::native_compiler()));
        assert_eq!(engine.start(None).err(), Some(StudioError::CannotStartScene));
        assert!(!engine.is_running());
    }

    #[test]
    fn tick_updates_only_outside_edit_mode() {
        let (mut engine, scene) = engine_with_scene();
        let module = engine
            .registry()
            .get_prototype_game_module_by_name("Counter")
            .unwrap();
        let (go_id, attachment_uid) = {
            let manager = engine
                .scene_manager_mut()
                .get_scene_by_id_mut(&scene)
                .unwrap()
                .game_object_manager_mut();
            let go = manager.create_game_object("Object");
            let attachment = go.add_prototype_gm(module);
            (go.id().to_string(), attachment.uid)
        };

        engine.start(Some(&scene)).unwrap();
        engine.tick(0.016).unwrap();

        let manager = engine
            .scene_manager()
            .current_scene()
            .unwrap()
            .game_object_manager();
        let go = manager.get_game_object_by_id(&go_id).unwrap();
        let live = &go.runtime_game_modules()[0];
        assert_eq!(live.uid(), attachment_uid);
        // Start set 10, one tick's Update bumped it to 11.
        assert_eq!(live.property("count"), Some(crate::Value::Number(11.0)));

        engine.set_edit_mode(true).unwrap();
        engine.tick(0.016).unwrap();
        let manager = engine
            .scene_manager()
            .current_scene()
            .unwrap()
            .game_object_manager();
        let go = manager.get_game_object_by_id(&go_id).unwrap();
        // Restarted by the mode switch, and edit-mode ticks do not update.
        assert_eq!(
            go.runtime_game_modules()[0].property("count"),
            Some(crate::Value::Number(10.0))
        );
    }

    #[test]
    fn finalize_finishes_current_scene() {
        let (mut engine, scene) = engine_with_scene();
        engine.start(Some(&scene)).unwrap();
        engine.finalize().unwrap();

        assert!(!engine.is_running());
        assert_eq!(engine.scene_manager().current_scene_id(), None);
        // Finalizing when stopped is a no-op.
        engine.finalize().unwrap();
    }

    #[test]
    fn module_removal_strips_attachments() {
        let (mut engine, scene) = engine_with_scene();
        let module = engine
            .registry()
            .get_prototype_game_module_by_name("Counter")
            .unwrap();
        let module_id = module.borrow().id().to_string();

        {
            let manager = engine
                .scene_manager_mut()
                .get_scene_by_id_mut(&scene)
                .unwrap()
                .game_object_manager_mut();
            manager.create_game_object("Object").add_prototype_gm(module);
        }

        engine.remove_game_module_by_name("Counter");
        assert!(engine
            .registry()
            .get_prototype_game_module_by_id(&module_id)
            .is_err());
        let manager = engine
            .scene_manager()
            .get_scene_by_id(&scene)
            .unwrap()
            .game_object_manager();
        assert!(manager.game_objects()[0].prototype_game_modules().is_empty());

        // Removing again is a silent no-op.
        engine.remove_game_module_by_name("Counter");
    }
}
