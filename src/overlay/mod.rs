mod compositor;

pub use compositor::{OverlayCompositor, OverlayFrame};

use crate::geometry::DisplayBox;
use std::cell::Cell;

/// Resize-aware handle on the video element's displayed box
///
/// The compositor polls this every render instead of relying on whatever
/// happened to trigger the render.
pub trait SizeObserver {
    /// Current displayed box, `None` while the element is not laid out
    fn observe(&self) -> Option<DisplayBox>;
}

/// Observer for a box that is set from outside (layout callbacks, CLI args)
#[derive(Debug, Default)]
pub struct ObservedBox {
    current: Cell<Option<DisplayBox>>,
}

impl ObservedBox {
    pub fn new(display: DisplayBox) -> Self {
        Self {
            current: Cell::new(Some(display)),
        }
    }

    pub fn set(&self, display: DisplayBox) {
        self.current.set(Some(display));
    }

    pub fn clear(&self) {
        self.current.set(None);
    }
}

impl SizeObserver for ObservedBox {
    fn observe(&self) -> Option<DisplayBox> {
        self.current.get()
    }
}
