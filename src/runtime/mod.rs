mod native;

pub use native::{run, Instrument};
