//! Scene collection and run state machine. At most one scene is current;
//! starting any scene finishes the previous one completely first.

use uuid::Uuid;

use crate::core::registry::GameModuleRegistry;
use crate::error::{StudioError, StudioResult};
use crate::renderer::RenderScene;
use crate::runtime::manager::GameObjectManager;

pub struct SceneObject {
    id: String,
    name: String,
    render_scene: RenderScene,
    game_object_manager: GameObjectManager,
}

impl SceneObject {
    fn new(id: String, name: String) -> Self {
        let game_object_manager = GameObjectManager::new(&id);
        Self {
            id,
            name,
            render_scene: RenderScene::new(),
            game_object_manager,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn game_object_manager(&self) -> &GameObjectManager {
        &self.game_object_manager
    }

    pub fn game_object_manager_mut(&mut self) -> &mut GameObjectManager {
        &mut self.game_object_manager
    }

    pub fn render_scene(&self) -> &RenderScene {
        &self.render_scene
    }

    fn setup(&mut self, registry: &GameModuleRegistry) -> StudioResult<()> {
        self.game_object_manager.game_setup(registry)
    }

    fn start(&self) -> StudioResult<()> {
        self.game_object_manager.game_start()
    }

    fn update(&self, delta_time: f64) -> StudioResult<()> {
        self.game_object_manager.game_update(delta_time)
    }

    fn finish(&mut self) {
        self.game_object_manager.game_finish();
    }

    fn render(&mut self) {
        self.render_scene.render();
    }
}

pub struct SceneManager {
    scenes: Vec<SceneObject>,
    default_scene: Option<String>,
    current_scene: Option<String>,
}

impl Default for SceneManager {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneManager {
    pub fn new() -> Self {
        Self {
            scenes: Vec::new(),
            default_scene: None,
            current_scene: None,
        }
    }

    pub fn new_scene(&mut self, name: &str) -> StudioResult<&SceneObject> {
        let id = Uuid::new_v4().to_string();
        self.add_scene(id, name)
    }

    pub fn new_scene_with_id(&mut self, name: &str, id: &str) -> StudioResult<&SceneObject> {
        self.add_scene(id.to_string(), name)
    }

    fn add_scene(&mut self, id: String, name: &str) -> StudioResult<&SceneObject> {
        if name.trim().is_empty() {
            return Err(StudioError::SceneNameEmpty);
        }
        if self.scenes.iter().any(|s| s.name == name || s.id == id) {
            return Err(StudioError::SceneDuplicated);
        }
        self.scenes.push(SceneObject::new(id, name.to_string()));
        // Just pushed, so the collection is non-empty.
        Ok(self.scenes.last().unwrap())
    }

    pub fn remove_scene_by_id(&mut self, id: &str) -> StudioResult<SceneObject> {
        let index = self
            .scenes
            .iter()
            .position(|s| s.id == id)
            .ok_or(StudioError::SceneNotFound)?;
        Ok(self.remove_at(index))
    }

    pub fn remove_scene_by_name(&mut self, name: &str) -> StudioResult<SceneObject> {
        let index = self
            .scenes
            .iter()
            .position(|s| s.name == name)
            .ok_or(StudioError::SceneNotFound)?;
        Ok(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> SceneObject {
        let mut scene = self.scenes.remove(index);
        if self.current_scene.as_deref() == Some(scene.id()) {
            scene.finish();
            self.current_scene = None;
        }
        if self.default_scene.as_deref() == Some(scene.id()) {
            self.default_scene = None;
        }
        scene
    }

    pub fn get_scene_by_id(&self, id: &str) -> StudioResult<&SceneObject> {
        self.scenes
            .iter()
            .find(|s| s.id == id)
            .ok_or(StudioError::SceneNotFound)
    }

    pub fn get_scene_by_id_mut(&mut self, id: &str) -> StudioResult<&mut SceneObject> {
        self.scenes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StudioError::SceneNotFound)
    }

    pub fn get_scene_by_name(&self, name: &str) -> StudioResult<&SceneObject> {
        self.scenes
            .iter()
            .find(|s| s.name == name)
            .ok_or(StudioError::SceneNotFound)
    }

    pub fn scenes(&self) -> &[SceneObject] {
        &self.scenes
    }

    pub fn default_scene_id(&self) -> Option<&str> {
        self.default_scene.as_deref()
    }

    pub fn current_scene_id(&self) -> Option<&str> {
        self.current_scene.as_deref()
    }

    /// The default must already be a member of the collection.
    pub fn set_default_scene_by_id(&mut self, id: &str) -> StudioResult<()> {
        self.get_scene_by_id(id)?;
        self.default_scene = Some(id.to_string());
        Ok(())
    }

    pub fn set_default_scene_by_name(&mut self, name: &str) -> StudioResult<()> {
        let id = self.get_scene_by_name(name)?.id().to_string();
        self.default_scene = Some(id);
        Ok(())
    }

    /// Make a scene current and run its setup and start. The previous
    /// current scene, if any, is finished completely first. With no
    /// argument, restarts the current scene, falling back to the default.
    pub fn start_scene(
        &mut self,
        id: Option<&str>,
        registry: &GameModuleRegistry,
    ) -> StudioResult<()> {
        let previous = self.current_scene.take();
        if let Some(prev_id) = &previous {
            if let Some(scene) = self.scenes.iter_mut().find(|s| s.id == *prev_id) {
                scene.finish();
            }
        }

        let target = match id {
            Some(id) => {
                self.get_scene_by_id(id)?;
                id.to_string()
            }
            None => previous
                .or_else(|| self.default_scene.clone())
                .ok_or(StudioError::CannotStartScene)?,
        };

        let scene = self
            .scenes
            .iter_mut()
            .find(|s| s.id == target)
            .ok_or(StudioError::CannotStartScene)?;
        scene.setup(registry)?;
        scene.start()?;
        self.current_scene = Some(target);
        Ok(())
    }

    pub fn start_scene_by_id(
        &mut self,
        id: &str,
        registry: &GameModuleRegistry,
    ) -> StudioResult<()> {
        self.get_scene_by_id(id)?;
        let id = id.to_string();
        self.start_scene(Some(&id), registry)
    }

    pub fn start_scene_by_name(
        &mut self,
        name: &str,
        registry: &GameModuleRegistry,
    ) -> StudioResult<()> {
        let id = self.get_scene_by_name(name)?.id().to_string();
        self.start_scene(Some(&id), registry)
    }

    pub fn swap_by_id(&mut self, id: &str, registry: &GameModuleRegistry) -> StudioResult<()> {
        self.start_scene_by_id(id, registry)
    }

    pub fn swap_by_name(&mut self, name: &str, registry: &GameModuleRegistry) -> StudioResult<()> {
        self.start_scene_by_name(name, registry)
    }

    pub fn finish_current_scene(&mut self) -> StudioResult<()> {
        let id = self
            .current_scene
            .take()
            .ok_or(StudioError::CurrentSceneNotExists)?;
        if let Some(scene) = self.scenes.iter_mut().find(|s| s.id == id) {
            scene.finish();
        }
        Ok(())
    }

    pub fn current_scene(&self) -> StudioResult<&SceneObject> {
        let id = self
            .current_scene
            .as_deref()
            .ok_or(StudioError::CurrentSceneNotExists)?;
        self.get_scene_by_id(id)
    }

    pub fn current_scene_mut(&mut self) -> StudioResult<&mut SceneObject> {
        let id = self
            .current_scene
            .clone()
            .ok_or(StudioError::CurrentSceneNotExists)?;
        self.scenes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StudioError::SceneNotFound)
    }

    pub fn scene_render(&mut self) -> StudioResult<()> {
        self.current_scene_mut()?.render();
        Ok(())
    }

    pub fn scene_update(&mut self, delta_time: f64) -> StudioResult<()> {
        self.current_scene()?.update(delta_time)
    }

    /// Strip attachments of a removed module from every scene.
    pub fn remove_attachments_of_module(&mut self, module_id: &str) {
        for scene in &mut self.scenes {
            scene.game_object_manager.remove_attachments_of_module(module_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn scene_creation_enforces_names() {
        let mut manager = SceneManager::new();
        assert_eq!(manager.new_scene("").err(), Some(StudioError::SceneNameEmpty));
        assert_eq!(manager.new_scene("   ").err(), Some(StudioError::SceneNameEmpty));

        manager.new_scene("Main").unwrap();
        assert_eq!(
            manager.new_scene("Main").err(),
            Some(StudioError::SceneDuplicated)
        );
        assert_eq!(manager.scenes().len(), 1);
    }

    #[test]
    fn scene_creation_enforces_unique_ids() {
        let mut manager = SceneManager::new();
        manager.new_scene_with_id("Main", "scene-1").unwrap();
        assert_eq!(
            manager.new_scene_with_id("Other", "scene-1").err(),
            Some(StudioError::SceneDuplicated)
        );
    }

    #[test]
    fn remove_scene() {
        let mut manager = SceneManager::new();
        let id = manager.new_scene("Main").unwrap().id().to_string();
        manager.new_scene("Other").unwrap();

        manager.remove_scene_by_id(&id).unwrap();
        assert_eq!(manager.scenes().len(), 1);
        assert_eq!(
            manager.remove_scene_by_id(&id).err(),
            Some(StudioError::SceneNotFound)
        );
        assert_eq!(
            manager.remove_scene_by_name("Main").err(),
            Some(StudioError::SceneNotFound)
        );
    }

    #[test]
    fn start_scene_requires_a_target() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        assert_eq!(
            manager.start_scene(None, &registry).err(),
            Some(StudioError::CannotStartScene)
        );

        let id = manager.new_scene("Main").unwrap().id().to_string();
        // A scene exists but nothing selects it.
        assert_eq!(
            manager.start_scene(None, &registry).err(),
            Some(StudioError::CannotStartScene)
        );

        manager.set_default_scene_by_id(&id).unwrap();
        manager.start_scene(None, &registry).unwrap();
        assert_eq!(manager.current_scene_id(), Some(id.as_str()));
    }

    #[test]
    fn start_scene_by_name_and_swap() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        let first = manager.new_scene("First").unwrap().id().to_string();
        let second = manager.new_scene("Second").unwrap().id().to_string();

        manager.start_scene_by_name("First", &registry).unwrap();
        assert_eq!(manager.current_scene_id(), Some(first.as_str()));
        assert!(manager.current_scene().unwrap().game_object_manager().is_running());

        manager.swap_by_id(&second, &registry).unwrap();
        assert_eq!(manager.current_scene_id(), Some(second.as_str()));
        // The previous scene was finished before the swap.
        assert!(!manager
            .get_scene_by_id(&first)
            .unwrap()
            .game_object_manager()
            .is_running());

        assert_eq!(
            manager.start_scene_by_name("Missing", &registry).err(),
            Some(StudioError::SceneNotFound)
        );
    }

    #[test]
    fn restart_without_argument_reuses_current() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        let id = manager.new_scene("Main").unwrap().id().to_string();
        manager.start_scene_by_id(&id, &registry).unwrap();

        manager.start_scene(None, &registry).unwrap();
        assert_eq!(manager.current_scene_id(), Some(id.as_str()));
    }

    #[test]
    fn finish_current_scene() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        assert_eq!(
            manager.finish_current_scene().err(),
            Some(StudioError::CurrentSceneNotExists)
        );

        let id = manager.new_scene("Main").unwrap().id().to_string();
        manager.start_scene_by_id(&id, &registry).unwrap();
        manager.finish_current_scene().unwrap();
        assert_eq!(manager.current_scene_id(), None);
        assert!(!manager
            .get_scene_by_id(&id)
            .unwrap()
            .game_object_manager()
            .is_running());
    }

    #[test]
    fn update_and_render_need_a_current_scene() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        assert_eq!(
            manager.scene_update(0.016).err(),
            Some(StudioError::CurrentSceneNotExists)
        );
        assert_eq!(
            manager.scene_render().err(),
            Some(StudioError::CurrentSceneNotExists)
        );

        let id = manager.new_scene("Main").unwrap().id().to_string();
        manager.start_scene_by_id(&id, &registry).unwrap();
        manager.scene_update(0.016).unwrap();
        manager.scene_render().unwrap();
        assert_eq!(manager.current_scene().unwrap().render_scene().frames(), 1);
    }

    #[test]
    fn removing_current_scene_clears_state() {
        let registry = testing::fixture_registry();
        let mut manager = SceneManager::new();
        let id = manager.new_scene("Main").unwrap().id().to_string();
        manager.set_default_scene_by_id(&id).unwrap();
        manager.start_scene_by_id(&id, &registry).unwrap();

        manager.remove_scene_by_id(&id).unwrap();
        assert_eq!(manager.current_scene_id(), None);
        assert_eq!(manager.default_scene_id(), None);
    }

    #[test]
    fn default_scene_must_be_a_member() {
        let mut manager = SceneManager::new();
        assert_eq!(
            manager.set_default_scene_by_id("missing").err(),
            Some(StudioError::SceneNotFound)
        );
    }
}
