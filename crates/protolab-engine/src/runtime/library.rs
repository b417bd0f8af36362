//! The runtime namespace: safe-name-keyed constructors for every registered
//! module, plus the ambient declarations injected into every compilation.
//!
//! The table is owned by one registry and passed by reference wherever
//! constructors are resolved; nothing here is process-global.

use std::collections::HashMap;
use std::sync::Arc;

use crate::compile::class::CompiledClass;
use crate::compile::TypeDeclaration;

const GAME_MODULE_DECLARATION: &str = r"namespace Lib {
export declare abstract class GameModule {
    constructor(gameObject: GameObject, prototypeId: string, uid: string);
    abstract Start(): void;
    abstract Update(deltaTime: number): void;
    get gameObject(): GameObject;
}
}";

const GAME_OBJECT_DECLARATION: &str = r"namespace Lib {
export declare class GameObject {
    constructor();
    Start(): void;
    Update(deltaTime: number): void;
}
}";

const EXPOSE_DECLARATION: &str = r"namespace Lib {
export declare function Expose(): (target: Object, propertyKey: string) => void;
}";

/// Ambient declarations every compiled module sees: the base module and
/// game object classes and the expose annotation.
pub fn default_declarations() -> Vec<TypeDeclaration> {
    vec![
        TypeDeclaration {
            uri: "lib:GameModule.d.ts".to_string(),
            text: GAME_MODULE_DECLARATION.to_string(),
        },
        TypeDeclaration {
            uri: "lib:GameObject.d.ts".to_string(),
            text: GAME_OBJECT_DECLARATION.to_string(),
        },
        TypeDeclaration {
            uri: "lib:Expose.d.ts".to_string(),
            text: EXPOSE_DECLARATION.to_string(),
        },
    ]
}

/// Live constructor table for one registry: safe name → compiled class.
pub struct RuntimeLibrary {
    modules: HashMap<String, Arc<CompiledClass>>,
}

impl RuntimeLibrary {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
        }
    }

    /// Install (or replace) the constructor registered under `safe_name`.
    pub fn install(&mut self, safe_name: &str, class: Arc<CompiledClass>) {
        self.modules.insert(safe_name.to_string(), class);
    }

    pub fn uninstall(&mut self, safe_name: &str) {
        self.modules.remove(safe_name);
    }

    pub fn resolve(&self, safe_name: &str) -> Option<Arc<CompiledClass>> {
        self.modules.get(safe_name).cloned()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    pub fn clear(&mut self) {
        self.modules.clear();
    }
}

impl Default for RuntimeLibrary {
    fn default() -> Self {
        Self::new()
    }
}
