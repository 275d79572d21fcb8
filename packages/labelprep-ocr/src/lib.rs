pub mod engine;
pub mod region;
pub mod remote;

pub use engine::{OcrEngine, OcrError, OcrInput};
pub use region::{Detection, Point};
pub use remote::RemoteOcrEngine;
