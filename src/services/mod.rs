pub mod action_map;
pub mod activation;
pub mod control_server;
pub mod gesture_controller;
pub mod keycode_map;
pub mod landmark_source;
pub mod virtual_device;

pub use activation::ActivationFlag;
pub use gesture_controller::GestureController;
pub use virtual_device::{ActionExecutor, VirtualInput};
