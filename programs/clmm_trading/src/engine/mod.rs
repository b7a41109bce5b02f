pub mod position_manager;
pub mod swap;
pub mod tick_sequence;

pub use position_manager::*;
pub use swap::*;
pub use tick_sequence::*;
