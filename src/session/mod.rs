mod state;
mod workbench;

pub use state::{Asset, CropTicket, MaskTicket, Session};
pub use workbench::Workbench;
