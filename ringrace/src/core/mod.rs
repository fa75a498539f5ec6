pub mod ai;
pub mod car;
pub mod collision;
pub mod error;
pub mod events;
pub mod geom;
pub mod handle_race;
pub mod kinematics;
pub mod lap_timer;
pub mod race;
pub mod track;
