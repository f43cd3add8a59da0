pub mod control;
pub mod watch;
