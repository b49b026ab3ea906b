pub mod defaults;
pub mod fields;
pub mod parser;
pub mod pipeline;
