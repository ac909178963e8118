//! Map objects held in a hecs world.

use hecs::{Component, Entity, World};
use log::debug;

use warmap_core::components::{Droid, Feature, Owner, Projectile, Structure, WorldPos};
use warmap_terrain::ObjectRegistry;

/// Every object standing on the map.
pub struct ObjectWorld {
    world: World,
    despawn_buffer: Vec<Entity>,
}

impl Default for ObjectWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectWorld {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            despawn_buffer: Vec::new(),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Total number of objects.
    pub fn len(&self) -> usize {
        self.world.len() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.world.len() == 0
    }

    /// Number of objects carrying component `T`.
    pub fn count<T: Component>(&self) -> usize {
        self.world.query::<&T>().iter().count()
    }

    pub fn spawn_droid(&mut self, pos: WorldPos, owner: u8) -> Entity {
        self.world.spawn((pos, Owner(owner), Droid))
    }

    pub fn spawn_structure(&mut self, pos: WorldPos, owner: u8, blocking: bool) -> Entity {
        self.world.spawn((pos, Owner(owner), Structure { blocking }))
    }

    pub fn spawn_feature(&mut self, pos: WorldPos) -> Entity {
        self.world.spawn((pos, Feature))
    }

    pub fn spawn_projectile(&mut self, pos: WorldPos, owner: u8) -> Entity {
        self.world.spawn((pos, Owner(owner), Projectile))
    }

    /// Despawn every entity with component `T`. Returns how many went.
    /// Reuses one buffer so repeated clears do not allocate.
    fn despawn_with<T: Component>(&mut self) -> usize {
        self.despawn_buffer.clear();
        for (entity, _) in self.world.query_mut::<&T>() {
            self.despawn_buffer.push(entity);
        }
        let count = self.despawn_buffer.len();
        for entity in self.despawn_buffer.drain(..) {
            let _ = self.world.despawn(entity);
        }
        count
    }
}

impl ObjectRegistry for ObjectWorld {
    fn clear_droids(&mut self) {
        let n = self.despawn_with::<Droid>();
        debug!("cleared {n} droids");
    }

    fn clear_structures(&mut self) {
        let n = self.despawn_with::<Structure>();
        debug!("cleared {n} structures");
    }

    fn clear_features(&mut self) {
        let n = self.despawn_with::<Feature>();
        debug!("cleared {n} features");
    }

    fn clear_projectiles(&mut self) {
        let n = self.despawn_with::<Projectile>();
        debug!("cleared {n} projectiles");
    }
}
