//! Per-scene collection of game objects, the expose-query engine, and the
//! value/dependency injection graph. All reads and writes of exposed state
//! on live instances go through [`ExposeValue`] accessors so observers see
//! every assignment, whatever its origin.

use crate::compile::class::ExposeMetadata;
use crate::core::registry::GameModuleRegistry;
use crate::error::{StudioError, StudioResult};
use crate::runtime::game_object::GameObject;
use crate::runtime::instance::{InjectionHandle, RuntimeGameModule};
use crate::runtime::value::{ExposeType, Value};

/// Address of one exposed member: (game object, attachment, property key).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExposeReference {
    pub game_object_id: String,
    pub game_module_uid: String,
    pub property_key: String,
}

impl ExposeReference {
    pub fn new(game_object_id: &str, game_module_uid: &str, property_key: &str) -> Self {
        Self {
            game_object_id: game_object_id.to_string(),
            game_module_uid: game_module_uid.to_string(),
            property_key: property_key.to_string(),
        }
    }
}

/// One attachment's matching expose entries, keyed by member name.
#[derive(Debug, Clone)]
pub struct ModuleExposeData {
    pub game_module_uid: String,
    pub metadata: ExposeMetadata,
}

/// All matching expose entries of one game object.
#[derive(Debug, Clone)]
pub struct GameObjectExpose {
    pub game_object_id: String,
    pub modules: Vec<ModuleExposeData>,
}

/// Live accessor for one exposed member of one running instance. The only
/// sanctioned path for external reads and writes of exposed state.
#[derive(Clone)]
pub struct ExposeValue {
    pub game_object_id: String,
    pub game_module_uid: String,
    pub property_key: String,
    pub ty: ExposeType,
    module: RuntimeGameModule,
}

impl ExposeValue {
    pub fn value(&self) -> StudioResult<Value> {
        self.module
            .property(&self.property_key)
            .ok_or_else(|| StudioError::FailedToResolveExposeData(self.property_key.clone()))
    }

    /// Writes funnel through the instance's property interceptor, so every
    /// registered observer fires.
    pub fn set_value(&self, value: impl Into<Value>) {
        self.module.set_property(&self.property_key, value.into());
    }

    pub fn invoke(&self, args: &[Value]) -> StudioResult<Value> {
        self.module.call(&self.property_key, args)
    }
}

struct ValueInjection {
    handle: InjectionHandle,
    value: Value,
    target: ExposeReference,
}

struct DependencyInjection {
    handle: InjectionHandle,
    source: ExposeReference,
    target: ExposeReference,
}

pub struct GameObjectManager {
    scene_id: String,
    game_objects: Vec<GameObject>,
    value_injections: Vec<ValueInjection>,
    dependency_injections: Vec<DependencyInjection>,
    running: bool,
}

impl GameObjectManager {
    pub fn new(scene_id: &str) -> Self {
        Self {
            scene_id: scene_id.to_string(),
            game_objects: Vec::new(),
            value_injections: Vec::new(),
            dependency_injections: Vec::new(),
            running: false,
        }
    }

    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn create_game_object(&mut self, name: &str) -> &mut GameObject {
        self.game_objects.push(GameObject::new(&self.scene_id, name));
        // Fresh uuid, cannot collide with an existing object.
        self.game_objects.last_mut().unwrap()
    }

    pub fn create_game_object_with_id(
        &mut self,
        name: &str,
        id: &str,
    ) -> StudioResult<&mut GameObject> {
        self.add_game_object(GameObject::with_id(&self.scene_id, name, id))
    }

    pub fn add_game_object(&mut self, game_object: GameObject) -> StudioResult<&mut GameObject> {
        if self.game_objects.iter().any(|g| g.id() == game_object.id()) {
            return Err(StudioError::GameObjectDuplicated);
        }
        self.game_objects.push(game_object);
        Ok(self.game_objects.last_mut().unwrap())
    }

    pub fn remove_game_object_by_id(&mut self, id: &str) -> StudioResult<GameObject> {
        let index = self
            .game_objects
            .iter()
            .position(|g| g.id() == id)
            .ok_or(StudioError::GameObjectNotFound)?;
        Ok(self.game_objects.remove(index))
    }

    pub fn get_game_object_by_id(&self, id: &str) -> StudioResult<&GameObject> {
        self.game_objects
            .iter()
            .find(|g| g.id() == id)
            .ok_or(StudioError::GameObjectNotFound)
    }

    pub fn get_game_object_by_id_mut(&mut self, id: &str) -> StudioResult<&mut GameObject> {
        self.game_objects
            .iter_mut()
            .find(|g| g.id() == id)
            .ok_or(StudioError::GameObjectNotFound)
    }

    pub fn game_objects(&self) -> &[GameObject] {
        &self.game_objects
    }

    pub fn clear(&mut self) {
        self.game_objects.clear();
        self.value_injections.clear();
        self.dependency_injections.clear();
        self.running = false;
    }

    /// Drop every attachment referencing the removed module, scene-wide.
    pub fn remove_attachments_of_module(&mut self, module_id: &str) {
        for game_object in &mut self.game_objects {
            game_object.remove_attachments_of_module(module_id);
        }
    }

    /// Collect every exposed member of the given type across the scene,
    /// grouped per game object and per attachment. Objects and attachments
    /// with no match are omitted.
    pub fn query_expose_data(&self, ty: ExposeType, ignore: &[&str]) -> Vec<GameObjectExpose> {
        let mut result = Vec::new();
        for game_object in &self.game_objects {
            if ignore.contains(&game_object.id()) {
                continue;
            }
            let mut modules = Vec::new();
            for attachment in game_object.prototype_game_modules() {
                let metadata: ExposeMetadata = attachment
                    .module
                    .borrow()
                    .expose_metadata()
                    .iter()
                    .filter(|(_, item)| item.ty == ty)
                    .map(|(key, item)| (key.clone(), item.clone()))
                    .collect();
                if !metadata.is_empty() {
                    modules.push(ModuleExposeData {
                        game_module_uid: attachment.uid.clone(),
                        metadata,
                    });
                }
            }
            if !modules.is_empty() {
                result.push(GameObjectExpose {
                    game_object_id: game_object.id().to_string(),
                    modules,
                });
            }
        }
        result
    }

    /// Turn one query result entry into live accessors. Requires a running
    /// scene since the accessors bind to live instances.
    pub fn acquire_expose_value(
        &self,
        expose: &GameObjectExpose,
    ) -> StudioResult<Vec<ExposeValue>> {
        if !self.running {
            return Err(StudioError::GameNotRunning);
        }
        let mut values = Vec::new();
        for entry in &expose.modules {
            let module = self.resolve_runtime(&expose.game_object_id, &entry.game_module_uid)?;
            for (key, item) in &entry.metadata {
                if !module.has_member(key) {
                    return Err(StudioError::FailedToResolveExposeData(key.clone()));
                }
                values.push(ExposeValue {
                    game_object_id: expose.game_object_id.clone(),
                    game_module_uid: entry.game_module_uid.clone(),
                    property_key: key.clone(),
                    ty: item.ty,
                    module: module.clone(),
                });
            }
        }
        Ok(values)
    }

    /// Record a literal override of the target member, applied at the next
    /// setup after dependency wiring and before `Start`.
    pub fn add_value_injection(
        &mut self,
        value: impl Into<Value>,
        target: ExposeReference,
    ) -> StudioResult<InjectionHandle> {
        self.validate_reference(&target)?;
        let handle = InjectionHandle::fresh();
        self.value_injections.push(ValueInjection {
            handle,
            value: value.into(),
            target,
        });
        Ok(handle)
    }

    /// Record a live propagation link from source member to target member,
    /// wired at the next setup.
    pub fn add_dependency_injection(
        &mut self,
        source: ExposeReference,
        target: ExposeReference,
    ) -> StudioResult<InjectionHandle> {
        self.validate_reference(&source)?;
        self.validate_reference(&target)?;
        let handle = InjectionHandle::fresh();
        self.dependency_injections.push(DependencyInjection {
            handle,
            source,
            target,
        });
        Ok(handle)
    }

    /// Removing an absent handle is a no-op. Detaching a dependency link
    /// leaves every other link through the same source intact.
    pub fn remove_injection(&mut self, handle: InjectionHandle) {
        if let Some(index) = self.value_injections.iter().position(|i| i.handle == handle) {
            self.value_injections.remove(index);
            return;
        }
        if let Some(index) = self
            .dependency_injections
            .iter()
            .position(|i| i.handle == handle)
        {
            let injection = self.dependency_injections.remove(index);
            if self.running {
                if let Ok(source) =
                    self.resolve_runtime(&injection.source.game_object_id, &injection.source.game_module_uid)
                {
                    source.remove_observer(injection.handle);
                }
            }
        }
    }

    /// Instantiate every game object, wire dependency injections (observer
    /// plus an immediate copy of the source value), then apply value
    /// injections. `Start` runs afterward and may overwrite either.
    pub fn game_setup(&mut self, registry: &GameModuleRegistry) -> StudioResult<()> {
        self.running = true;
        for game_object in &mut self.game_objects {
            game_object.setup(registry.library())?;
        }

        for injection in &self.dependency_injections {
            let source =
                self.resolve_runtime(&injection.source.game_object_id, &injection.source.game_module_uid)?;
            let target =
                self.resolve_runtime(&injection.target.game_object_id, &injection.target.game_module_uid)?;
            let source_key = &injection.source.property_key;
            let target_key = &injection.target.property_key;
            let initial = source
                .property(source_key)
                .ok_or_else(|| StudioError::FailedToResolveExposeData(source_key.clone()))?;
            if target.property(target_key).is_none() {
                return Err(StudioError::FailedToResolveExposeData(target_key.clone()));
            }
            source.observe(injection.handle, source_key, &target, target_key);
            target.set_property(target_key, initial);
        }

        for injection in &self.value_injections {
            let target =
                self.resolve_runtime(&injection.target.game_object_id, &injection.target.game_module_uid)?;
            let key = &injection.target.property_key;
            if target.property(key).is_none() {
                return Err(StudioError::FailedToResolveExposeData(key.clone()));
            }
            target.set_property(key, injection.value.clone());
        }
        Ok(())
    }

    pub fn game_start(&self) -> StudioResult<()> {
        for game_object in &self.game_objects {
            game_object.start()?;
        }
        Ok(())
    }

    pub fn game_update(&self, delta_time: f64) -> StudioResult<()> {
        for game_object in &self.game_objects {
            game_object.update(delta_time)?;
        }
        Ok(())
    }

    pub fn game_finish(&mut self) {
        for game_object in &mut self.game_objects {
            game_object.finish();
        }
        self.running = false;
    }

    /// Exactly one live instance must carry the uid; more than one means the
    /// attachment uid uniqueness invariant was violated upstream.
    fn resolve_runtime(&self, game_object_id: &str, uid: &str) -> StudioResult<RuntimeGameModule> {
        let game_object = self.get_game_object_by_id(game_object_id)?;
        let mut matches = game_object
            .runtime_game_modules()
            .iter()
            .filter(|m| m.uid() == uid);
        let first = matches.next().ok_or(StudioError::ModuleNotFound)?;
        if matches.next().is_some() {
            return Err(StudioError::NameDuplicated);
        }
        Ok(first.clone())
    }

    fn validate_reference(&self, reference: &ExposeReference) -> StudioResult<()> {
        let game_object = self.get_game_object_by_id(&reference.game_object_id)?;
        game_object.get_proto_gm_by_uid(&reference.game_module_uid)?;
        Ok(())
    }
}
