pub mod controller;
pub mod player;
pub mod progress;
pub mod registry;
pub mod segment;
pub mod state;
pub mod view;

pub use controller::*;
pub use player::*;
pub use progress::*;
pub use registry::*;
pub use segment::*;
pub use state::*;
pub use view::*;
