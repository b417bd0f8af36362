pub mod compile;
pub mod core;
pub mod error;
pub mod project;
pub mod renderer;
pub mod runtime;

#[cfg(test)]
mod testing;

// Re-export key types at crate root for convenience
pub use compile::class::{
    ClassBuilder, CompiledClass, ExposeMetadata, ExposeMetadataItem, ModuleBehavior,
};
pub use compile::native::NativeClassCompiler;
pub use compile::{CompileMachine, CompileOutput, Diagnostic, DiagnosticPosition, TypeDeclaration};
pub use core::engine::GameEngine;
pub use core::prototype::{PrototypeGameModule, SharedGameModule};
pub use core::registry::GameModuleRegistry;
pub use core::scene::{SceneManager, SceneObject};
pub use error::{StudioError, StudioResult};
pub use project::Project;
pub use renderer::{RenderScene, TransformNode};
pub use runtime::game_object::{GameObject, InstantiableProtoGM};
pub use runtime::instance::{InjectionHandle, ModuleScope, RuntimeGameModule};
pub use runtime::library::RuntimeLibrary;
pub use runtime::manager::{
    ExposeReference, ExposeValue, GameObjectExpose, GameObjectManager, ModuleExposeData,
};
pub use runtime::value::{ExposeType, Value};
