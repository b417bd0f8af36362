pub mod engine;
pub mod prototype;
pub mod registry;
pub mod scene;
