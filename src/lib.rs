// Traversal locomotion for kinematic characters
//
// - util: math, curves, ramps, timers
// - engine: collision queries and kinematic bodies (parry3d)
// - game: characters, interactive actors, locomotion state machine

pub mod engine;
pub mod game;
pub mod util;
