pub mod environment;
pub mod terminal;
pub mod text;
pub mod time;

pub use environment::{DATA_DIR_ENV, default_data_dir, default_download_dir};
pub use terminal::sanitize_for_terminal;
pub use text::{first_line, format_file_size, sanitize_file_name, truncate_for_display};
pub use time::{format_age, format_stamp};
