/// Filesystem adapters for reading manifests, walking project trees and writing output
mod file_reader;
mod file_writer;
mod nuspec_parser;
mod solution_parser;
mod walkdir_globber;

pub use file_reader::FileSystemReader;
pub use file_writer::{FileSystemWriter, StdoutPresenter};
pub use walkdir_globber::WalkDirGlobber;
