pub mod charts;
pub mod footer;
pub mod header;
pub mod picture;
pub mod utils;

pub use footer::draw_footer;
pub use header::draw_header;
pub use picture::draw_picture;
pub use utils::{department_color, truncate, winner_colors};
