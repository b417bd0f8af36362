//! Live module instances and the interception layer around their state.
//!
//! A live instance is never handed out raw: every read and write — external
//! tooling, dependency propagation, and the module's own code — goes through
//! the same property routine, so observers attached to a property see every
//! assignment regardless of origin.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use uuid::Uuid;

use crate::compile::class::CompiledClass;
use crate::error::{StudioError, StudioResult};
use crate::runtime::value::Value;

/// Handle identifying one registered injection. Removing an injection
/// detaches exactly the observer carrying this handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InjectionHandle(Uuid);

impl InjectionHandle {
    pub fn fresh() -> Self {
        Self(Uuid::new_v4())
    }
}

/// One value-propagation edge: when the observed property is written, the
/// new value is forwarded into `target_key` on the target instance.
#[derive(Clone)]
struct Observer {
    handle: InjectionHandle,
    target: Weak<RefCell<InstanceState>>,
    target_key: String,
}

/// Mutable state behind one live module instance: the property bag seeded
/// from the class's field defaults, plus per-property observers.
pub struct InstanceState {
    props: HashMap<String, Value>,
    observers: HashMap<String, Vec<Observer>>,
}

impl InstanceState {
    fn new(class: &CompiledClass) -> Self {
        let mut props = HashMap::new();
        for field in class.fields() {
            props.insert(field.name.clone(), field.default.clone());
        }
        Self {
            props,
            observers: HashMap::new(),
        }
    }
}

/// Write `value` into `key`, then fan the assignment out to that property's
/// observers. A write of the value already stored is a no-op, which is what
/// terminates observation cycles.
fn write_property(state: &Rc<RefCell<InstanceState>>, key: &str, value: Value) {
    let observers = {
        let mut s = state.borrow_mut();
        if s.props.get(key) == Some(&value) {
            return;
        }
        s.props.insert(key.to_string(), value.clone());
        s.observers.get(key).cloned().unwrap_or_default()
    };

    for observer in observers {
        if let Some(target) = observer.target.upgrade() {
            write_property(&target, &observer.target_key, value.clone());
        }
    }
}

/// One live module created from an attachment while its scene runs.
/// Cloning is cheap and yields another handle onto the same instance.
#[derive(Clone)]
pub struct RuntimeGameModule {
    uid: String,
    prototype_id: String,
    game_object_id: String,
    class: Arc<CompiledClass>,
    state: Rc<RefCell<InstanceState>>,
}

impl RuntimeGameModule {
    /// Instantiate `class` for one attachment slot.
    pub fn instantiate(
        class: Arc<CompiledClass>,
        game_object_id: &str,
        prototype_id: &str,
        uid: &str,
    ) -> Self {
        let state = Rc::new(RefCell::new(InstanceState::new(&class)));
        Self {
            uid: uid.to_string(),
            prototype_id: prototype_id.to_string(),
            game_object_id: game_object_id.to_string(),
            class,
            state,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn prototype_id(&self) -> &str {
        &self.prototype_id
    }

    pub fn game_object_id(&self) -> &str {
        &self.game_object_id
    }

    pub fn class(&self) -> &Arc<CompiledClass> {
        &self.class
    }

    /// Whether `key` resolves to a data property or a declared method.
    pub fn has_member(&self, key: &str) -> bool {
        self.state.borrow().props.contains_key(key) || self.class.has_method(key)
    }

    pub fn property(&self, key: &str) -> Option<Value> {
        self.state.borrow().props.get(key).cloned()
    }

    /// Assign a property through the interception layer.
    pub fn set_property(&self, key: &str, value: Value) {
        write_property(&self.state, key, value);
    }

    /// Attach a propagation edge from `key` on this instance to
    /// `target_key` on `target`.
    pub fn observe(&self, handle: InjectionHandle, key: &str, target: &Self, target_key: &str) {
        let observer = Observer {
            handle,
            target: Rc::downgrade(&target.state),
            target_key: target_key.to_string(),
        };
        self.state
            .borrow_mut()
            .observers
            .entry(key.to_string())
            .or_default()
            .push(observer);
    }

    /// Detach the observer registered under `handle`, if any. Other edges
    /// through the same property stay intact.
    pub fn remove_observer(&self, handle: InjectionHandle) {
        let mut s = self.state.borrow_mut();
        for observers in s.observers.values_mut() {
            observers.retain(|o| o.handle != handle);
        }
    }

    pub fn start(&self) -> StudioResult<()> {
        let behavior = self.class.behavior();
        behavior.start(&self.scope())
    }

    pub fn update(&self, delta_time: f64) -> StudioResult<()> {
        let behavior = self.class.behavior();
        behavior.update(&self.scope(), delta_time)
    }

    /// Invoke one of the class's declared methods on this instance.
    pub fn call(&self, method: &str, args: &[Value]) -> StudioResult<Value> {
        if !self.class.has_method(method) {
            return Err(StudioError::FailedToResolveExposeData(method.to_string()));
        }
        let behavior = self.class.behavior();
        behavior.call(&self.scope(), method, args)
    }

    fn scope(&self) -> ModuleScope {
        ModuleScope {
            module: self.clone(),
        }
    }
}

/// What a module behavior sees as `self`. Its `set` is the interception
/// routine, so a module mutating its own fields triggers the same
/// observers an external write would.
pub struct ModuleScope {
    module: RuntimeGameModule,
}

impl ModuleScope {
    pub fn get(&self, key: &str) -> Option<Value> {
        self.module.property(key)
    }

    /// Current numeric value of `key`, or 0 when absent or non-numeric.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).and_then(|v| v.as_number()).unwrap_or(0.0)
    }

    /// Current string value of `key`, or empty when absent or non-string.
    pub fn string(&self, key: &str) -> String {
        self.get(key)
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default()
    }

    pub fn set(&self, key: &str, value: impl Into<Value>) {
        self.module.set_property(key, value.into());
    }

    /// Invoke another declared method on the same instance.
    pub fn call(&self, method: &str, args: &[Value]) -> StudioResult<Value> {
        self.module.call(method, args)
    }

    pub fn game_object_id(&self) -> &str {
        self.module.game_object_id()
    }

    pub fn uid(&self) -> &str {
        self.module.uid()
    }
}
