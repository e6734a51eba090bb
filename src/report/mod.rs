pub mod attachment;
pub mod console;
pub mod html;
pub mod json;
pub mod junit;
pub mod report_model;
