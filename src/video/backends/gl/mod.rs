pub mod capabilities;
pub mod device;
pub mod types;

pub use self::capabilities::{Capabilities, Version};
pub use self::device::GLDevice;
