// Engine modules: collision queries and kinematic bodies

pub mod physics;
