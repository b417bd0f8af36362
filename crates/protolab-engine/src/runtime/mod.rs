pub mod game_object;
pub mod instance;
pub mod library;
pub mod manager;
pub mod value;
