//! Terminal user interface components.

pub mod error;
pub mod lesson;

pub use error::show_error_screen;
pub use lesson::LessonTui;
