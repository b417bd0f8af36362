//! A scene entity: an ordered list of prototype-module attachments and,
//! while the scene runs, their live instantiated counterparts.

use uuid::Uuid;

use crate::core::prototype::SharedGameModule;
use crate::error::{StudioError, StudioResult};
use crate::renderer::TransformNode;
use crate::runtime::instance::RuntimeGameModule;
use crate::runtime::library::RuntimeLibrary;

/// One instantiable slot: an attachment uid paired with the prototype it
/// references. The same prototype may be attached more than once, each
/// attachment under its own uid.
#[derive(Clone)]
pub struct InstantiableProtoGM {
    pub uid: String,
    pub module: SharedGameModule,
}

pub struct GameObject {
    id: String,
    name: String,
    scene_id: String,

    attachments: Vec<InstantiableProtoGM>,
    runtime_modules: Vec<RuntimeGameModule>,
    node: Option<TransformNode>,
}

impl GameObject {
    pub fn new(scene_id: &str, name: &str) -> Self {
        Self::with_id(scene_id, name, &Uuid::new_v4().to_string())
    }

    /// Construct with an explicit id (used when restoring a saved project).
    pub fn with_id(scene_id: &str, name: &str, id: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            scene_id: scene_id.to_string(),
            attachments: Vec::new(),
            runtime_modules: Vec::new(),
            node: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scene_id(&self) -> &str {
        &self.scene_id
    }

    /// Attach a prototype module under a fresh uid. Always succeeds;
    /// attaching the same prototype again yields a second, independent slot.
    pub fn add_prototype_gm(&mut self, module: SharedGameModule) -> InstantiableProtoGM {
        self.add_prototype_gm_with_uid(&Uuid::new_v4().to_string(), module)
    }

    /// Attach under an explicit uid (used when restoring a saved project).
    pub fn add_prototype_gm_with_uid(
        &mut self,
        uid: &str,
        module: SharedGameModule,
    ) -> InstantiableProtoGM {
        let attachment = InstantiableProtoGM {
            uid: uid.to_string(),
            module,
        };
        self.attachments.push(attachment.clone());
        attachment
    }

    /// Detach the slot with the given uid and return its prototype.
    pub fn remove_proto_gm_by_uid(&mut self, uid: &str) -> StudioResult<SharedGameModule> {
        let index = self
            .attachments
            .iter()
            .position(|a| a.uid == uid)
            .ok_or(StudioError::ModuleNotFound)?;
        Ok(self.attachments.remove(index).module)
    }

    pub fn get_proto_gm_by_uid(&self, uid: &str) -> StudioResult<&InstantiableProtoGM> {
        self.attachments
            .iter()
            .find(|a| a.uid == uid)
            .ok_or(StudioError::ModuleNotFound)
    }

    /// Drop every attachment referencing the given prototype module id.
    /// Reaction hook for registry-level module removal.
    pub fn remove_attachments_of_module(&mut self, module_id: &str) {
        self.attachments
            .retain(|a| a.module.borrow().id() != module_id);
    }

    pub fn prototype_game_modules(&self) -> &[InstantiableProtoGM] {
        &self.attachments
    }

    pub fn runtime_game_modules(&self) -> &[RuntimeGameModule] {
        &self.runtime_modules
    }

    /// Drop attachments and any live state.
    pub fn clear(&mut self) {
        self.attachments.clear();
        self.finish();
    }

    /// Instantiate one live module per attachment, in attachment order, and
    /// claim scene presence. Every referenced prototype must be installed
    /// in the runtime library.
    pub fn setup(&mut self, library: &RuntimeLibrary) -> StudioResult<()> {
        self.runtime_modules.clear();
        self.node = Some(TransformNode::new(&self.name));

        for attachment in &self.attachments {
            let module = attachment.module.borrow();
            let class = library
                .resolve(&module.safe_name())
                .ok_or(StudioError::ModuleNotFound)?;
            self.runtime_modules.push(RuntimeGameModule::instantiate(
                class,
                &self.id,
                module.id(),
                &attachment.uid,
            ));
        }

        Ok(())
    }

    /// Fan `Start` out to every live module in attachment order. User-code
    /// errors propagate to the caller.
    pub fn start(&self) -> StudioResult<()> {
        for module in &self.runtime_modules {
            module.start()?;
        }
        Ok(())
    }

    pub fn update(&self, delta_time: f64) -> StudioResult<()> {
        for module in &self.runtime_modules {
            module.update(delta_time)?;
        }
        Ok(())
    }

    /// Discard live instances and scene presence; attachments persist so a
    /// later setup can re-instantiate.
    pub fn finish(&mut self) {
        self.runtime_modules.clear();
        self.node = None;
    }

    /// Scene-presence handle; only valid while live.
    pub fn node(&self) -> StudioResult<&TransformNode> {
        self.node.as_ref().ok_or(StudioError::GameNotRunning)
    }

    pub fn node_mut(&mut self) -> StudioResult<&mut TransformNode> {
        self.node.as_mut().ok_or(StudioError::GameNotRunning)
    }
}
