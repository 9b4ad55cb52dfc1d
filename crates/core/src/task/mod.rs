//! Task lifecycle: identifiers, state, admission control and file accumulation.

mod error;
mod id;
mod limits;
mod store;
mod types;

pub use error::{TaskError, ValidationError};
pub use id::{generate_id, IdGenerator, RandomIdGenerator, ID_BYTES};
pub use limits::TaskLimits;
pub use store::{AppendOutcome, TaskStore};
pub use types::{BundleOutcome, Task, TaskStatus, TaskStatusReport};
