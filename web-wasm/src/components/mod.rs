pub mod header;
pub mod upload_form;
pub mod progress_bar;
pub mod summary_panel;
pub mod toolbar;
pub mod results_table;
