pub mod animation;
pub mod app;
pub mod asset;
pub mod error;
pub mod model;
pub mod renderer;
pub mod scene;
pub mod settings;
pub mod shell;
pub mod ui;
