mod app;
mod components;
mod theme;

pub use app::App;
