pub mod search;
pub mod table;

pub use search::{SearchQuery, DATA_VIEWER_COLUMNS, LINKED_IMAGE, VECTOR_VIEWER_COLUMNS};
pub use table::{render_table, DISTANCE_COLUMN};
