pub mod commands;
pub mod service;

pub use service::RecordService;
