pub mod interval;
pub mod record;

pub use interval::Interval;
pub use record::TimeRecord;
