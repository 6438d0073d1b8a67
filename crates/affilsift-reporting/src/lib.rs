pub mod export;
pub mod naming;

pub use export::{export_csv, write_csv};
pub use naming::{clean_search_query, generate_filename};
