/// I/O operations for reading SACD images and writing DSD containers

/// DSDIFF container writer
pub mod dsdiff;
/// DSF container writer
pub mod dsf;
/// Disc image reader
pub mod reader;
/// Logical sector access
pub mod sector;
/// Container writer trait and factory
pub mod writer;

pub use dsdiff::DsdiffWriter;
pub use dsf::DsfWriter;
pub use reader::{read_disc, read_sacd};
pub use sector::{sector_payload, ImageSource, SectorReader};
pub use writer::{create_writer, ContainerWriter};
