pub mod events;
pub mod messages;
pub mod presets;
pub mod references;
pub mod results;
pub mod settings;
pub mod store;
