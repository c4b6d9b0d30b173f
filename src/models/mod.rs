pub mod question;
pub mod review;
pub mod student;

pub use question::Question;
pub use review::{ReviewRow, Source, Status};
pub use student::StudentRow;
