pub mod cards;
pub mod footer;
pub mod header;
pub mod utils;

pub use cards::draw_card_grid;
pub use footer::{draw_footer, StatusMessage};
pub use header::draw_header;
