//! SlideMerge Render Library
//!
//! Presentation adapters over the shared content projector: editor and
//! preview frames in display pixels, and the deck export sink in inches.

mod deck;
mod fit;
mod frame;

pub use deck::{Deck, DeckImage, DeckItem, DeckLayout, DeckSink, DeckSlide, DeckText, InchBox, SinkError};
pub use fit::{contain_rect, image_size};
pub use frame::{
    EditorFrame, FrameContent, FrameItem, FrameText, HANDLE_SIZE_PX, PreviewFrame, RendererError, parse_color,
};
