pub mod placeholder;
pub mod player;
pub mod session;
pub mod substitution;
pub mod token;
