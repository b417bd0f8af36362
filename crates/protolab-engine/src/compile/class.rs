use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::StudioResult;
use crate::runtime::instance::ModuleScope;
use crate::runtime::value::{ExposeType, Value};

/// Per-member reflection record: the declared value type, plus parameter and
/// return types when the member is a method.
#[derive(Debug, Clone, PartialEq)]
pub struct ExposeMetadataItem {
    pub ty: ExposeType,
    pub param_types: Option<Vec<ExposeType>>,
    pub return_type: Option<ExposeType>,
}

/// Member name → reflection record, for every member flagged as exposed.
/// This table is the sole contract other components use to discover which
/// members of a module type may be queried or injected.
pub type ExposeMetadata = BTreeMap<String, ExposeMetadataItem>;

/// A field declared by a compiled module class.
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub ty: ExposeType,
    pub default: Value,
    pub exposed: bool,
}

/// A method declared by a compiled module class. The body itself lives in
/// the class's `ModuleBehavior`; this is the declared signature.
#[derive(Debug, Clone)]
pub struct MethodDef {
    pub name: String,
    pub param_types: Vec<ExposeType>,
    pub return_type: Option<ExposeType>,
    pub exposed: bool,
}

/// Executable entry points of a compiled module class. Implementations must
/// route every self-write through the given scope so that observers attached
/// to the live instance see the assignment.
pub trait ModuleBehavior {
    fn start(&self, scope: &ModuleScope) -> StudioResult<()>;

    fn update(&self, scope: &ModuleScope, delta_time: f64) -> StudioResult<()>;

    /// Invoke a declared method by name.
    fn call(&self, scope: &ModuleScope, method: &str, args: &[Value]) -> StudioResult<Value>;
}

/// A behavior with no fields and empty entry points. What an empty authored
/// module compiles to.
pub struct InertBehavior;

impl ModuleBehavior for InertBehavior {
    fn start(&self, _scope: &ModuleScope) -> StudioResult<()> {
        Ok(())
    }

    fn update(&self, _scope: &ModuleScope, _delta_time: f64) -> StudioResult<()> {
        Ok(())
    }

    fn call(&self, _scope: &ModuleScope, method: &str, _args: &[Value]) -> StudioResult<Value> {
        Err(crate::error::StudioError::FailedToResolveExposeData(
            method.to_string(),
        ))
    }
}

/// The instantiable artifact produced by the compiler boundary for one
/// module class: declared members plus the executable behavior they bind to.
pub struct CompiledClass {
    class_name: String,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    behavior: Arc<dyn ModuleBehavior>,
}

// Behavior is an opaque trait object; debug output covers the declared
// surface only.
impl std::fmt::Debug for CompiledClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledClass")
            .field("class_name", &self.class_name)
            .field("fields", &self.fields)
            .field("methods", &self.methods)
            .finish_non_exhaustive()
    }
}

impl CompiledClass {
    pub fn builder(class_name: &str) -> ClassBuilder {
        ClassBuilder {
            class_name: class_name.to_string(),
            fields: Vec::new(),
            methods: Vec::new(),
            behavior: None,
        }
    }

    /// An inert class with the given name and no members.
    pub fn empty(class_name: &str) -> Self {
        Self::builder(class_name).build()
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn methods(&self) -> &[MethodDef] {
        &self.methods
    }

    pub fn behavior(&self) -> Arc<dyn ModuleBehavior> {
        Arc::clone(&self.behavior)
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.methods.iter().any(|m| m.name == name)
    }

    /// Build the reflection table from the members flagged as exposed.
    /// Fields carry their declared value type; methods carry `Function`
    /// plus their parameter and return types.
    pub fn expose_metadata(&self) -> ExposeMetadata {
        let mut metadata = ExposeMetadata::new();
        for field in self.fields.iter().filter(|f| f.exposed) {
            metadata.insert(
                field.name.clone(),
                ExposeMetadataItem {
                    ty: field.ty,
                    param_types: None,
                    return_type: None,
                },
            );
        }
        for method in self.methods.iter().filter(|m| m.exposed) {
            metadata.insert(
                method.name.clone(),
                ExposeMetadataItem {
                    ty: ExposeType::Function,
                    param_types: Some(method.param_types.clone()),
                    return_type: method.return_type,
                },
            );
        }
        metadata
    }
}

/// Assembles a `CompiledClass` member by member. This is the structured
/// side-channel a compiler implementation uses to report declared members
/// and expose flags instead of decorator reflection.
pub struct ClassBuilder {
    class_name: String,
    fields: Vec<FieldDef>,
    methods: Vec<MethodDef>,
    behavior: Option<Arc<dyn ModuleBehavior>>,
}

impl ClassBuilder {
    pub fn field(mut self, name: &str, ty: ExposeType, default: Value) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            default,
            exposed: false,
        });
        self
    }

    /// Declare a field and flag it for external visibility.
    pub fn exposed_field(mut self, name: &str, ty: ExposeType, default: Value) -> Self {
        self.fields.push(FieldDef {
            name: name.to_string(),
            ty,
            default,
            exposed: true,
        });
        self
    }

    pub fn method(mut self, name: &str, params: &[ExposeType], ret: Option<ExposeType>) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            param_types: params.to_vec(),
            return_type: ret,
            exposed: false,
        });
        self
    }

    /// Declare a method and flag it for external visibility.
    pub fn exposed_method(
        mut self,
        name: &str,
        params: &[ExposeType],
        ret: Option<ExposeType>,
    ) -> Self {
        self.methods.push(MethodDef {
            name: name.to_string(),
            param_types: params.to_vec(),
            return_type: ret,
            exposed: true,
        });
        self
    }

    pub fn behavior(mut self, behavior: impl ModuleBehavior + 'static) -> Self {
        self.behavior = Some(Arc::new(behavior));
        self
    }

    pub fn build(self) -> CompiledClass {
        CompiledClass {
            class_name: self.class_name,
            fields: self.fields,
            methods: self.methods,
            behavior: self.behavior.unwrap_or_else(|| Arc::new(InertBehavior)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expose_metadata_only_lists_flagged_members() {
        let class = CompiledClass::builder("counter")
            .exposed_field("count", ExposeType::Number, Value::Number(0.0))
            .field("hidden", ExposeType::Bool, Value::Bool(false))
            .exposed_method("Count", &[], Some(ExposeType::Number))
            .method("Internal", &[], None)
            .build();

        let metadata = class.expose_metadata();
        assert_eq!(metadata.len(), 2);
        assert_eq!(metadata["count"].ty, ExposeType::Number);
        assert_eq!(metadata["Count"].ty, ExposeType::Function);
        assert_eq!(metadata["Count"].return_type, Some(ExposeType::Number));
    }

    #[test]
    fn empty_class_has_no_metadata() {
        let class = CompiledClass::empty("blank");
        assert!(class.expose_metadata().is_empty());
        assert!(!class.has_method("anything"));
    }

    #[test]
    fn debug_output_lists_declared_surface() {
        let class = CompiledClass::builder("counter")
            .exposed_field("count", ExposeType::Number, Value::Number(0.0))
            .build();
        let text = format!("{class:?}");
        assert!(text.contains("CompiledClass"));
        assert!(text.contains("counter"));
        assert!(text.contains("count"));

        // Must stay formattable inside a compile output as well.
        let output = crate::compile::CompileOutput {
            class: Some(Arc::new(class)),
            ..Default::default()
        };
        assert!(format!("{output:?}").contains("counter"));
    }
}
