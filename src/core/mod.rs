// Core modules implementing payload segmentation, parsing, and error modeling.
pub mod error;
pub mod manual;
pub mod parse;
pub mod record;
pub mod scheme;
