//! Thin stand-in for the external rendering engine. The runtime core only
//! needs two things from it: a named transform node marking a game object's
//! presence in a scene, and a per-frame render tick on the scene handle.

use glam::{Quat, Vec3};

/// Scene-presence handle for one live game object.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformNode {
    pub name: String,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl TransformNode {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Rendering-scene handle owned by each scene object. Headless: it counts
/// frames and leaves actual drawing to the embedding application.
#[derive(Debug, Default)]
pub struct RenderScene {
    frames: u64,
}

impl RenderScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// One render tick.
    pub fn render(&mut self) {
        self.frames += 1;
        log::trace!("render frame {}", self.frames);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}
