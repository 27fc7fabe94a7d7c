// Game modules: characters, locomotion, interactive actors

pub mod characters;
pub mod interactive;
pub mod locomotion;
