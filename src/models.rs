pub mod dispatch;
pub mod process;
pub mod tenant;
