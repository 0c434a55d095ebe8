pub mod dispatch;
pub mod export;
pub mod import;
pub mod instance;
pub mod item;
pub mod log;
pub mod shared;
