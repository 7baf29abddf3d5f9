//! I/O layer: the little-endian primitive encoder, the file sink and the
//! endian read helpers used by the read-back parser.

mod encoder;
mod endian;
mod sink;

pub use encoder::LeEncoder;
pub use endian::{read_f64_be, read_f64_le, read_u16_be, read_u16_le, read_u32_be, read_u32_le};
pub use sink::FileSink;
