pub mod command;
pub mod result;

pub use command::{normalize, ContinuousMotion, DiscreteAction, MotionIntent, PtzCommand};
pub use result::{DispatchResult, Outcome};
