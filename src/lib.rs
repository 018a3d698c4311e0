pub mod assemble;
pub mod error;
pub mod feed;
pub mod logging;
pub mod model;
pub mod output;
pub mod pipeline;
pub mod style;
