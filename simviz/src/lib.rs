pub mod chart;
pub mod error;
pub mod fitness;
pub mod frame;
pub mod plotters_ext;
pub mod render;
pub mod tile;

pub mod prelude {
    pub use crate::chart::*;
    pub use crate::error::VizError;
    pub use crate::fitness::*;
    pub use crate::frame::*;
    pub use crate::plotters_ext::*;
    pub use crate::render::*;
    pub use crate::tile::*;
}
