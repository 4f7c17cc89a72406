use cucumber::given;

use crate::cucumber::{commerce_world::CommerceSystem, CommerceWorld};

#[given("a fresh install")]
async fn fresh_install(world: &mut CommerceWorld) {
    world.system = Some(CommerceSystem::new().await);
}
