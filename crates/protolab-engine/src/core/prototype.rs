//! A named, versioned wrapper around one user-authored module: its source,
//! its compiled artifact, and the reflection metadata extracted after
//! installation.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

use uuid::Uuid;

use crate::compile::class::{CompiledClass, ExposeMetadata};
use crate::compile::native::source_declares_class;
use crate::compile::TypeDeclaration;
use crate::error::{StudioError, StudioResult};

/// Registry, attachments and editor layers all share the same module
/// object; the studio runs single threaded.
pub type SharedGameModule = Rc<RefCell<PrototypeGameModule>>;

pub struct PrototypeGameModule {
    id: String,
    name: String,

    origin_source: String,
    compiled_source: String,
    declaration: String,

    constructor: Option<Arc<CompiledClass>>,
    expose_metadata: ExposeMetadata,
}

impl PrototypeGameModule {
    pub fn new(name: &str) -> Self {
        Self::with_id(&Uuid::new_v4().to_string(), name)
    }

    /// Construct with an explicit id (used when restoring a saved project).
    pub fn with_id(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            origin_source: String::new(),
            compiled_source: String::new(),
            declaration: String::new(),
            constructor: None,
            expose_metadata: ExposeMetadata::new(),
        }
    }

    pub fn into_shared(self) -> SharedGameModule {
        Rc::new(RefCell::new(self))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renaming does not rewrite `origin_source`; if the authored class name
    /// no longer matches the derived safe name, the next source validation
    /// fails with `SourceInvalid`.
    pub fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
    }

    /// The runtime namespace key: lowercased name with every whitespace
    /// character replaced by an underscore.
    pub fn safe_name(&self) -> String {
        self.name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_whitespace() { '_' } else { c })
            .collect()
    }

    pub fn origin_source(&self) -> &str {
        &self.origin_source
    }

    /// Accept authored source only when it declares a class named exactly
    /// `safe_name` extending the base module type. Rejection leaves the
    /// stored source untouched.
    pub fn set_origin_source(&mut self, source: &str) -> StudioResult<()> {
        if !source_declares_class(source, &self.safe_name()) {
            return Err(StudioError::SourceInvalid);
        }
        self.origin_source = source.to_string();
        Ok(())
    }

    pub fn compiled_source(&self) -> &str {
        &self.compiled_source
    }

    /// Store the compiled body, declaration and constructor together.
    /// The compiled body must still pass the structural shape check.
    pub fn set_compiled(
        &mut self,
        body: &str,
        declaration: &str,
        class: Arc<CompiledClass>,
    ) -> StudioResult<()> {
        if !source_declares_class(body, &self.safe_name()) {
            return Err(StudioError::SourceInvalid);
        }
        self.compiled_source = body.to_string();
        self.declaration = declaration.to_string();
        self.constructor = Some(class);
        Ok(())
    }

    pub fn is_compiled(&self) -> bool {
        self.constructor.is_some()
    }

    pub fn constructor(&self) -> Option<Arc<CompiledClass>> {
        self.constructor.clone()
    }

    pub fn declaration(&self) -> TypeDeclaration {
        TypeDeclaration {
            uri: self.declaration_uri(),
            text: self.declaration.clone(),
        }
    }

    pub fn declaration_uri(&self) -> String {
        self.safe_name() + ".d.ts"
    }

    pub fn expose_metadata(&self) -> &ExposeMetadata {
        &self.expose_metadata
    }

    pub fn set_expose_metadata(&mut self, metadata: ExposeMetadata) {
        self.expose_metadata = metadata;
    }

    /// Skeleton source a freshly created module starts from.
    pub fn default_source(safe_name: &str) -> String {
        [
            &format!("class {safe_name} extends Lib.GameModule {{"),
            "    Start() {",
            "",
            "    }",
            "",
            "    Update(deltaTime: number) {",
            "",
            "    }",
            "}",
        ]
        .join("\n")
    }
}
