pub mod roster;
pub mod screen;
