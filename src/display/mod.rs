pub mod render;
pub mod target;

pub use render::{render_devices, RenderMode, RenderOptions};
#[cfg(test)]
pub use target::MemoryTarget;
pub use target::{FileTarget, RenderTarget};
