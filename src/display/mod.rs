pub mod export;
pub mod pagination;
pub mod sort;
pub mod table;

pub use export::{EXPORT_FILE_NAME, EXPORT_MEDIA_TYPE, to_csv, write_csv};
pub use pagination::{PageSlice, page_count, page_info, paginate};
pub use sort::{SortDirection, sort_indices, sorted_rows};
pub use table::TableDisplay;
