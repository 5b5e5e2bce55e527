mod any;
mod drifting;
mod error;
mod interface;
mod mutex;
mod state;
mod strict;

pub use any::*;
pub use drifting::*;
pub use error::*;
pub use interface::*;
pub use state::MAX_TURN_BACK_INDEX;
pub use strict::*;
