pub mod instance;
pub mod item;

pub use instance::InstanceCommands;
pub use item::{ItemAddArgs, ItemCommands, ItemUpdateArgs};
