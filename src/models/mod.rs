pub mod task;
pub mod user;

pub use task::{PageQuery, Task, TaskCreate, TaskListResponse, TaskUpdate};
pub use user::{PublicUser, User};
