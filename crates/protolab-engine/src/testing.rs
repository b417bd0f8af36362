//! Shared fixtures for the crate's tests: a native-class compiler loaded
//! with three small behaviors (a counter, a string accumulator, and a
//! doubler) plus the authored sources that map onto them.

use crate::compile::class::{CompiledClass, ModuleBehavior};
use crate::compile::native::NativeClassCompiler;
use crate::core::registry::GameModuleRegistry;
use crate::error::StudioResult;
use crate::runtime::instance::ModuleScope;
use crate::runtime::value::{ExposeType, Value};

struct CounterBehavior;

impl ModuleBehavior for CounterBehavior {
    fn start(&self, scope: &ModuleScope) -> StudioResult<()> {
        scope.set("count", 10.0);
        Ok(())
    }

    fn update(&self, scope: &ModuleScope, _delta_time: f64) -> StudioResult<()> {
        scope.call("Count", &[])?;
        Ok(())
    }

    fn call(&self, scope: &ModuleScope, method: &str, _args: &[Value]) -> StudioResult<Value> {
        match method {
            "Count" => {
                let next = scope.number("count") + 1.0;
                scope.set("count", next);
                Ok(Value::Number(next))
            }
            _ => Err(crate::error::StudioError::FailedToResolveExposeData(
                method.to_string(),
            )),
        }
    }
}

struct CountABehavior;

impl ModuleBehavior for CountABehavior {
    fn start(&self, scope: &ModuleScope) -> StudioResult<()> {
        scope.set("a", "start");
        Ok(())
    }

    fn update(&self, scope: &ModuleScope, _delta_time: f64) -> StudioResult<()> {
        scope.call("GetA", &[])?;
        Ok(())
    }

    fn call(&self, scope: &ModuleScope, method: &str, _args: &[Value]) -> StudioResult<Value> {
        match method {
            "GetA" => {
                let next = scope.string("a") + "a";
                scope.set("a", next.clone());
                Ok(Value::String(next))
            }
            _ => Err(crate::error::StudioError::FailedToResolveExposeData(
                method.to_string(),
            )),
        }
    }
}

struct DoublingBehavior;

impl ModuleBehavior for DoublingBehavior {
    fn start(&self, _scope: &ModuleScope) -> StudioResult<()> {
        Ok(())
    }

    fn update(&self, _scope: &ModuleScope, _delta_time: f64) -> StudioResult<()> {
        Ok(())
    }

    fn call(&self, scope: &ModuleScope, method: &str, _args: &[Value]) -> StudioResult<Value> {
        match method {
            "GetDouble" => Ok(Value::Number(scope.number("doublingNumber") * 2.0)),
            _ => Err(crate::error::StudioError::FailedToResolveExposeData(
                method.to_string(),
            )),
        }
    }
}

pub fn counter_class() -> CompiledClass {
    CompiledClass::builder("counter")
        .exposed_field("count", ExposeType::Number, Value::Number(0.0))
        .exposed_method("Count", &[], Some(ExposeType::Number))
        .behavior(CounterBehavior)
        .build()
}

pub fn counta_class() -> CompiledClass {
    CompiledClass::builder("counta")
        .exposed_field("a", ExposeType::String, Value::String(String::new()))
        .exposed_method("GetA", &[], Some(ExposeType::String))
        .behavior(CountABehavior)
        .build()
}

pub fn doubling_class() -> CompiledClass {
    CompiledClass::builder("doubling")
        .exposed_field("doublingNumber", ExposeType::Number, Value::Number(0.0))
        .exposed_method("GetDouble", &[], Some(ExposeType::Number))
        .behavior(DoublingBehavior)
        .build()
}

pub fn counter_source() -> String {
    [
        "class counter extends Lib.GameModule {",
        "   @Lib.Expose()",
        "   public count : number = 0;",
        "   public Start() { this.count = 10; }",
        "   public Update(deltaTime : number) { this.Count(); }",
        "   @Lib.Expose()",
        "   public Count() : number { this.count++; return this.count; }",
        "}",
    ]
    .join("\n")
}

pub fn counta_source() -> String {
    [
        "class counta extends Lib.GameModule {",
        "   @Lib.Expose()",
        "   public a : string = '';",
        "   public Start() { this.a = 'start' }",
        "   public Update(deltaTime : number) { this.GetA() }",
        "   @Lib.Expose()",
        "   public GetA() : string { this.a += 'a'; return this.a; }",
        "}",
    ]
    .join("\n")
}

pub fn doubling_source() -> String {
    [
        "class doubling extends Lib.GameModule {",
        "   @Lib.Expose()",
        "   public doublingNumber : number = 0;",
        "   public Start() { }",
        "   public Update(deltaTime : number) { }",
        "   @Lib.Expose()",
        "   public GetDouble() : number { return this.doublingNumber * 2; }",
        "}",
    ]
    .join("\n")
}

/// A compiler with every fixture class installed.
pub fn native_compiler() -> NativeClassCompiler {
    let mut compiler = NativeClassCompiler::new();
    compiler.install_class(counter_class());
    compiler.install_class(counta_class());
    compiler.install_class(doubling_class());
    compiler
}

/// A registry wired to the fixture compiler, with nothing registered yet.
pub fn native_registry() -> GameModuleRegistry {
    GameModuleRegistry::new(Box::new(native_compiler()))
}

/// A registry with the Counter, CountA and Doubling modules registered.
pub fn fixture_registry() -> GameModuleRegistry {
    let mut registry = native_registry();
    registry
        .register_by_source("Counter", &counter_source())
        .expect("counter registers");
    registry
        .register_by_source("CountA", &counta_source())
        .expect("counta registers");
    registry
        .register_by_source("Doubling", &doubling_source())
        .expect("doubling registers");
    registry
}
