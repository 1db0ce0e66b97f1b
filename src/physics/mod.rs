pub mod container;
pub mod energy;
pub mod initializer;
pub mod interactions;
pub mod lennard_jones;
pub mod math;
pub mod observables;
pub mod octree;
pub mod particle;
pub mod simulation;
pub mod species;
pub mod trajectory;
