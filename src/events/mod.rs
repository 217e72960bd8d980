pub mod gesture;
pub mod hand;
pub mod input;

pub use gesture::{Candidates, GestureEvent, GestureLabel, GestureStatus, Observation};
pub use hand::{FrameMessage, HandLandmarks, HandMessage, Handedness, Landmark};
pub use input::{InputAction, KeyCode, Modifiers, MouseButton, ScreenPoint};
