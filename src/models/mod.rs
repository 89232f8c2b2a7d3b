pub mod appointment;
pub mod catalog;
pub mod enums;
pub mod filters;
pub mod patient;
pub mod prescription;
pub mod reminder;
pub mod schedule;
pub mod updates;

pub use appointment::*;
pub use catalog::*;
pub use enums::*;
pub use filters::*;
pub use patient::*;
pub use prescription::*;
pub use reminder::*;
pub use schedule::*;
pub use updates::*;
