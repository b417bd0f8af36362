//! Central store for prototype game modules. The registry owns the compile
//! machine, the generated declaration set, and the runtime library, and
//! keeps the three in lockstep with the module list.

use std::sync::Arc;

use crate::compile::class::CompiledClass;
use crate::compile::{CompileMachine, TypeDeclaration};
use crate::core::prototype::{PrototypeGameModule, SharedGameModule};
use crate::error::{StudioError, StudioResult};
use crate::runtime::library::{default_declarations, RuntimeLibrary};

pub struct GameModuleRegistry {
    compiler: Box<dyn CompileMachine>,
    modules: Vec<SharedGameModule>,
    declarations: Vec<TypeDeclaration>,
    library: RuntimeLibrary,
}

impl GameModuleRegistry {
    pub fn new(compiler: Box<dyn CompileMachine>) -> Self {
        let mut registry = Self {
            compiler,
            modules: Vec::new(),
            declarations: Vec::new(),
            library: RuntimeLibrary::new(),
        };
        registry.refresh_compiler_declarations();
        registry
    }

    /// Create and register a module from the default skeleton source.
    pub fn register_new_module(&mut self, name: &str) -> StudioResult<SharedGameModule> {
        let mut module = PrototypeGameModule::new(name);
        let source = PrototypeGameModule::default_source(&module.safe_name());
        module.set_origin_source(&source)?;
        self.add_game_module(module.into_shared())
    }

    /// Create a module from authored source and register it.
    pub fn register_by_source(
        &mut self,
        name: &str,
        source: &str,
    ) -> StudioResult<SharedGameModule> {
        let mut module = PrototypeGameModule::new(name);
        module.set_origin_source(source)?;
        self.add_game_module(module.into_shared())
    }

    /// Register an already-built prototype module.
    pub fn register_by_module(
        &mut self,
        module: SharedGameModule,
    ) -> StudioResult<SharedGameModule> {
        self.add_game_module(module)
    }

    /// Uniqueness checks and compilation both run before any registry state
    /// changes, so a rejected module leaves the registry exactly as it was.
    fn add_game_module(&mut self, module: SharedGameModule) -> StudioResult<SharedGameModule> {
        {
            let incoming = module.borrow();
            for existing in &self.modules {
                let existing = existing.borrow();
                if existing.name() == incoming.name() {
                    return Err(StudioError::NameDuplicated);
                }
                if existing.id() == incoming.id() {
                    return Err(StudioError::IdDuplicated);
                }
            }
        }

        self.compile_module(&module)?;
        self.modules.push(module.clone());
        self.add_declaration(&module);
        self.install(&module);
        log::info!("registered game module `{}`", module.borrow().name());
        Ok(module)
    }

    /// Remove by identity. Absent modules are a silent no-op.
    pub fn remove_game_module_by_module(
        &mut self,
        module: &SharedGameModule,
    ) -> Option<SharedGameModule> {
        let index = self
            .modules
            .iter()
            .position(|m| std::rc::Rc::ptr_eq(m, module))?;
        Some(self.remove_at(index))
    }

    pub fn remove_game_module_by_name(&mut self, name: &str) -> Option<SharedGameModule> {
        let index = self.modules.iter().position(|m| m.borrow().name() == name)?;
        Some(self.remove_at(index))
    }

    pub fn remove_game_module_by_id(&mut self, id: &str) -> Option<SharedGameModule> {
        let index = self.modules.iter().position(|m| m.borrow().id() == id)?;
        Some(self.remove_at(index))
    }

    fn remove_at(&mut self, index: usize) -> SharedGameModule {
        let module = self.modules.remove(index);
        let uri = module.borrow().declaration_uri();
        self.declarations.retain(|d| d.uri != uri);
        self.library.uninstall(&module.borrow().safe_name());
        self.refresh_compiler_declarations();
        log::info!("removed game module `{}`", module.borrow().name());
        module
    }

    /// Replace a registered module's source, recompiling and republishing
    /// its declaration and constructor.
    pub fn modify_game_module_by_module(
        &mut self,
        module: &SharedGameModule,
        source: &str,
    ) -> StudioResult<()> {
        if !self.modules.iter().any(|m| std::rc::Rc::ptr_eq(m, module)) {
            return Err(StudioError::ModuleNotFound);
        }
        self.modify(module.clone(), source)
    }

    pub fn modify_game_module_by_name(&mut self, name: &str, source: &str) -> StudioResult<()> {
        let module = self
            .modules
            .iter()
            .find(|m| m.borrow().name() == name)
            .cloned()
            .ok_or(StudioError::ModuleNotFound)?;
        self.modify(module, source)
    }

    pub fn modify_game_module_by_id(&mut self, id: &str, source: &str) -> StudioResult<()> {
        let module = self
            .modules
            .iter()
            .find(|m| m.borrow().id() == id)
            .cloned()
            .ok_or(StudioError::ModuleNotFound)?;
        self.modify(module, source)
    }

    fn modify(&mut self, module: SharedGameModule, source: &str) -> StudioResult<()> {
        module.borrow_mut().set_origin_source(source)?;
        self.compile_module(&module)?;
        self.replace_declaration(&module)?;
        self.install(&module);
        Ok(())
    }

    pub fn get_prototype_game_module_by_id(&self, id: &str) -> StudioResult<SharedGameModule> {
        self.modules
            .iter()
            .find(|m| m.borrow().id() == id)
            .cloned()
            .ok_or(StudioError::ModuleNotFound)
    }

    pub fn get_prototype_game_module_by_name(&self, name: &str) -> StudioResult<SharedGameModule> {
        self.modules
            .iter()
            .find(|m| m.borrow().name() == name)
            .cloned()
            .ok_or(StudioError::ModuleNotFound)
    }

    /// Constructor lookup goes through the library so the answer always
    /// matches what `GameObject::setup` will resolve.
    pub fn get_game_module_constructor_by_id(&self, id: &str) -> StudioResult<Arc<CompiledClass>> {
        let module = self.get_prototype_game_module_by_id(id)?;
        let safe_name = module.borrow().safe_name();
        self.library.resolve(&safe_name).ok_or(StudioError::ModuleNotFound)
    }

    pub fn get_game_module_constructor_by_name(
        &self,
        name: &str,
    ) -> StudioResult<Arc<CompiledClass>> {
        let module = self.get_prototype_game_module_by_name(name)?;
        let safe_name = module.borrow().safe_name();
        self.library.resolve(&safe_name).ok_or(StudioError::ModuleNotFound)
    }

    pub fn prototype_game_modules(&self) -> &[SharedGameModule] {
        &self.modules
    }

    pub fn declarations(&self) -> &[TypeDeclaration] {
        &self.declarations
    }

    pub fn library(&self) -> &RuntimeLibrary {
        &self.library
    }

    /// Swap the compile machine. Registered modules keep their compiled
    /// artifacts; only future compilations use the new machine.
    pub fn set_compiler(&mut self, compiler: Box<dyn CompileMachine>) {
        self.compiler = compiler;
        self.refresh_compiler_declarations();
    }

    pub fn clear(&mut self) {
        self.modules.clear();
        self.declarations.clear();
        self.library.clear();
        self.compiler.set_code("");
        self.refresh_compiler_declarations();
    }

    fn compile_module(&mut self, module: &SharedGameModule) -> StudioResult<()> {
        let source = module.borrow().origin_source().to_string();
        self.compiler.set_code(&source);
        let output = self.compiler.compile();
        if output.is_fatal() {
            return Err(StudioError::CompileFailed(output.diagnostics));
        }
        let class = match output.class {
            Some(class) => class,
            None => return Err(StudioError::CompileFailed(output.diagnostics)),
        };
        let body = output.body.unwrap_or_default();
        let declaration = output.declaration.unwrap_or_default();
        module.borrow_mut().set_compiled(&body, &declaration, class)
    }

    fn add_declaration(&mut self, module: &SharedGameModule) {
        let declaration = module.borrow().declaration();
        self.declarations.push(TypeDeclaration {
            uri: declaration.uri,
            text: wrap_declaration(&declaration.text),
        });
        self.refresh_compiler_declarations();
    }

    fn replace_declaration(&mut self, module: &SharedGameModule) -> StudioResult<()> {
        let declaration = module.borrow().declaration();
        let slot = self
            .declarations
            .iter_mut()
            .find(|d| d.uri == declaration.uri)
            .ok_or(StudioError::ModuleNotFound)?;
        slot.text = wrap_declaration(&declaration.text);
        self.refresh_compiler_declarations();
        Ok(())
    }

    fn refresh_compiler_declarations(&mut self) {
        let mut declarations = default_declarations();
        declarations.extend(self.declarations.iter().cloned());
        self.compiler.set_declarations(declarations);
    }

    fn install(&mut self, module: &SharedGameModule) {
        let mut module = module.borrow_mut();
        if let Some(class) = module.constructor() {
            module.set_expose_metadata(class.expose_metadata());
            self.library.install(&module.safe_name(), class);
        }
    }
}

/// Module declarations are published to the compiler inside the shared
/// `Lib.modules` namespace so authored code can reference sibling modules.
fn wrap_declaration(text: &str) -> String {
    format!("namespace Lib {{\nexport namespace modules {{\nexport {text}\n}}\n}}")
}
