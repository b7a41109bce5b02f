pub mod close_position;
pub mod collect_fees;
pub mod collect_protocol_fees;
pub mod create_liquidity;
pub mod decrease_liquidity;
pub mod initialize_amm_config;
pub mod initialize_pool;
pub mod initialize_tick_array;
pub mod set_paused;
pub mod swap_v2;

pub use close_position::*;
pub use collect_fees::*;
pub use collect_protocol_fees::*;
pub use create_liquidity::*;
pub use decrease_liquidity::*;
pub use initialize_amm_config::*;
pub use initialize_pool::*;
pub use initialize_tick_array::*;
pub use set_paused::*;
pub use swap_v2::*;
