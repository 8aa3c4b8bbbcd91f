pub mod capture;
pub mod error;
pub mod logging;
pub mod notify;
pub mod settings;
pub mod stroke;
pub mod trace;

pub use error::{DrawError, ErrorKind};
