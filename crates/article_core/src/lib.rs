//! Article core: pure article model, image bookkeeping and the export state machine.
mod effect;
mod images;
mod model;
mod msg;
mod state;
mod update;
mod normalize;

pub use effect::Effect;
pub use images::{ImageMode, ImageReference, ImageRegistry, DEFAULT_IMAGE_EXTENSION};
pub use model::{Article, Block, CodeBlock, InlineSpan, MAX_HEADING_LEVEL};
pub use msg::Msg;
pub use state::{ExportState, Stage};
pub use update::update;
pub use normalize::normalize_article_url;
