pub mod adsense;
pub mod code;
pub mod handler;
pub mod image;
pub mod lead_form;
pub mod rich_text;

pub use handler::{AdTypeHandler, AdTypeRegistry};
