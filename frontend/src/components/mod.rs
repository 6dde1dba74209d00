pub mod header;
pub mod info_modal;
pub mod notices;
pub mod results;
pub mod upload_section;
pub mod utils;
