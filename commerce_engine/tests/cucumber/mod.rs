mod commerce_world;
mod fakes;
mod setups;
mod steps;

pub use commerce_world::CommerceWorld;
