pub mod guest;
pub mod job;
pub mod notification;
pub mod table;
pub mod wedding;
