pub mod amm_config;
pub mod observation;
pub mod pool;
pub mod position;
pub mod tick;
pub mod tick_array;

pub use amm_config::*;
pub use observation::*;
pub use pool::*;
pub use position::*;
pub use tick::*;
pub use tick_array::*;
