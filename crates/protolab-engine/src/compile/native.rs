//! A compiler boundary backed by host-registered native classes.
//!
//! The studio's built-in modules are written in Rust, not in the authored
//! scripting language; this machine maps the class name declared in the
//! staged source onto a table of `CompiledClass` artifacts registered by the
//! host. Sources whose class has no native backing compile to an inert empty
//! class (so a freshly created module with the default source always
//! registers), or to a fatal diagnostic in strict mode.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use crate::compile::class::CompiledClass;
use crate::compile::{
    CompileMachine, CompileOutput, Diagnostic, DiagnosticPosition, TypeDeclaration,
};
use crate::runtime::value::{ExposeType, Value};

static CLASS_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"class\s+([A-Za-z_][A-Za-z0-9_]*)\s+extends\s+Lib\s*\.\s*GameModule")
        .expect("class pattern is valid")
});

/// First class name declared as extending the base module type, if any.
pub fn parse_class_name(source: &str) -> Option<String> {
    CLASS_PATTERN.captures(source).map(|c| c[1].to_string())
}

/// Whether `source` declares a class named exactly `name` extending the
/// base module type, anywhere in the text.
pub fn source_declares_class(source: &str, name: &str) -> bool {
    CLASS_PATTERN.captures_iter(source).any(|c| &c[1] == name)
}

pub struct NativeClassCompiler {
    declarations: Vec<TypeDeclaration>,
    source: String,
    classes: HashMap<String, Arc<CompiledClass>>,
    strict: bool,
}

impl NativeClassCompiler {
    /// Lenient machine: unknown classes compile to an inert empty class.
    pub fn new() -> Self {
        Self {
            declarations: Vec::new(),
            source: String::new(),
            classes: HashMap::new(),
            strict: false,
        }
    }

    /// Strict machine: unknown classes are a fatal compile failure.
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::new()
        }
    }

    /// Register a native class under its own class name.
    pub fn install_class(&mut self, class: CompiledClass) {
        self.classes
            .insert(class.class_name().to_string(), Arc::new(class));
    }

    pub fn declarations(&self) -> &[TypeDeclaration] {
        &self.declarations
    }

    fn fatal(message: String) -> CompileOutput {
        CompileOutput::failure(vec![Diagnostic {
            position: DiagnosticPosition { line: 0, column: 0 },
            message,
        }])
    }
}

impl Default for NativeClassCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileMachine for NativeClassCompiler {
    fn set_declarations(&mut self, declarations: Vec<TypeDeclaration>) {
        self.declarations = declarations;
    }

    fn set_code(&mut self, source: &str) {
        self.source = source.to_string();
    }

    fn code(&self) -> &str {
        &self.source
    }

    fn compile(&mut self) -> CompileOutput {
        let Some(name) = parse_class_name(&self.source) else {
            return Self::fatal("no module class declaration found".to_string());
        };

        let class = match self.classes.get(&name) {
            Some(class) => Arc::clone(class),
            None if self.strict => {
                return Self::fatal(format!("no native class registered for `{name}`"));
            }
            None => Arc::new(CompiledClass::empty(&name)),
        };

        CompileOutput {
            diagnostics: Vec::new(),
            body: Some(emit_body(&class)),
            declaration: Some(emit_declaration(&class)),
            class: Some(class),
        }
    }
}

fn ts_type(ty: ExposeType) -> &'static str {
    match ty {
        ExposeType::Number => "number",
        ExposeType::String => "string",
        ExposeType::Bool => "boolean",
        ExposeType::Function => "Function",
    }
}

fn literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("{s:?}"),
    }
}

/// Normalized lowered body for a native-backed class. Keeps the structural
/// class declaration the registry re-validates after compilation.
fn emit_body(class: &CompiledClass) -> String {
    let mut out = format!("class {} extends Lib.GameModule {{\n", class.class_name());
    for field in class.fields() {
        out.push_str(&format!("    {} = {};\n", field.name, literal(&field.default)));
    }
    out.push_str("    Start() { /* native */ }\n");
    out.push_str("    Update(deltaTime) { /* native */ }\n");
    for method in class.methods() {
        let params: Vec<String> = (0..method.param_types.len())
            .map(|i| format!("p{i}"))
            .collect();
        out.push_str(&format!(
            "    {}({}) {{ /* native */ }}\n",
            method.name,
            params.join(", ")
        ));
    }
    out.push_str("}\n");
    out
}

/// Declaration text describing the class's public surface.
fn emit_declaration(class: &CompiledClass) -> String {
    let mut out = format!("declare class {} extends GameModule {{\n", class.class_name());
    for field in class.fields() {
        out.push_str(&format!("    {}: {};\n", field.name, ts_type(field.ty)));
    }
    out.push_str("    Start(): void;\n");
    out.push_str("    Update(deltaTime: number): void;\n");
    for method in class.methods() {
        let params: Vec<String> = method
            .param_types
            .iter()
            .enumerate()
            .map(|(i, ty)| format!("p{i}: {}", ts_type(*ty)))
            .collect();
        let ret = method.return_type.map(ts_type).unwrap_or("void");
        out.push_str(&format!(
            "    {}({}): {};\n",
            method.name,
            params.join(", "),
            ret
        ));
    }
    out.push_str("}\n");
    out
}
