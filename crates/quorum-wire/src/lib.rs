pub mod framing;
pub mod rpc;

pub use framing::*;
pub use rpc::*;
