mod demand;
mod parser;

pub use demand::{DemandNode, Jobspec, normalize};
pub use parser::{CountSpec, JobspecDocument, ResourceEntry};
