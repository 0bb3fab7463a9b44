pub mod archive;
pub mod path;
