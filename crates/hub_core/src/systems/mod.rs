pub mod arrival;
pub mod completion;
pub mod dispatch;
