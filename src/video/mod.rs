pub mod backends;
pub mod state;

pub use self::state::GraphicsStateSnapshot;
