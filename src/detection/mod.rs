//! Detection module for AudioMatchr

mod result;

pub use result::{
    Detection, DetectionResult, MergedDetection, Method, MethodState, MethodStatus,
};
