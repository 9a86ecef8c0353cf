pub mod attendance;
pub mod outcome;
pub mod student;
