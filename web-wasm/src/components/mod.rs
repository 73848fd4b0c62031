//! UIコンポーネント

pub mod header;
pub mod loading;
pub mod options_panel;
pub mod sample_picker;
pub mod saved_list;
pub mod summary_view;
pub mod upload_area;
