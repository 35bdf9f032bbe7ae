pub mod dispatch;
pub mod process;
