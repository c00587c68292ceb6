pub mod post;
pub mod window;
pub mod analysis;

pub use post::*;
pub use window::*;
pub use analysis::*;
