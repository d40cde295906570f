mod gesture;

pub use gesture::{GestureRouter, ViewState, FLING_MIN_DISTANCE, FLING_MIN_VELOCITY};
