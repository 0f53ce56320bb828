pub mod crates;
pub mod descriptions;
pub mod implementors;
pub mod load_site;

pub use crates::*;
pub use descriptions::*;
pub use implementors::*;
pub use load_site::*;
