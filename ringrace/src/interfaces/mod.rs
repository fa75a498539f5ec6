pub mod autopilot;
pub mod hud_interface;
