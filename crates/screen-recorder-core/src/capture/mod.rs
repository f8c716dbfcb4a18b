mod resolver;
mod target;

pub use {
    resolver::resolve,
    target::{CaptureOrigin, CaptureTarget, MonitorGeometry, SelectionRect},
};
