mod display;
mod task;

pub use display::{DisplayMeta, Painter};
pub use task::{
    Category, MAX_TITLE_LEN, NewTask, Priority, Statistics, Task, TaskFilter, TaskStatus,
    validate_title,
};
