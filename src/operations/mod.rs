pub mod config_op;
pub mod diagnostic_op;
pub mod move_op;
pub mod op_helper;
pub mod session_op;
