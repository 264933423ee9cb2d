pub mod render;
pub mod sender;
pub mod style;
pub mod templating;

pub use render::{render_document, render_node};
pub use sender::{run_campaign, SenderError};
pub use style::normalize;
pub use templating::substitute;
