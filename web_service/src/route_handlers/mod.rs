pub mod donation;
pub mod html_template;
pub mod logs;
pub mod settings;
