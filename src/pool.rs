//! Reusable entity pools.
//!
//! Spawn-heavy gameplay (projectiles, enemies, waves) acquires entities
//! from here instead of constructing them on the fly. Pooled-out entities
//! stay in the `World` carrying the [`Dormant`] marker so every behavior
//! system skips them; acquiring strips the marker, releasing restores it.

use bevy_ecs::{component::Component, entity::Entity, resource::Resource, system::Commands, world::World};
use tracing::{debug, info, warn};

pub type PoolId = usize;

/// Marker for entities currently held by their pool. Behavior systems must
/// treat dormant entities as absent from the world.
#[derive(Component, Default, Debug, Clone, Copy)]
pub struct Dormant;

/// Back-reference from a pooled entity to the pool that owns it. A plain
/// copyable id: holding it never extends the backing store's lifetime.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PooledBy(pub PoolId);

/// Constructs one dormant instance of the pool's template. The constructor
/// must attach [`Dormant`] and [`PooledBy`] itself so the instance starts
/// out owned by the pool.
pub type Prefab = Box<dyn Fn(&mut Commands, PoolId) -> Entity + Send + Sync>;

pub struct EntityPool {
    id: PoolId,
    label: &'static str,
    prefab: Prefab,
    available: Vec<Entity>,
    created: Vec<Entity>,
    initial_size: usize,
}

impl EntityPool {
    /// The number of instances currently held by the pool.
    pub fn available(&self) -> usize {
        self.available.len()
    }

    /// The number of instances currently out in the world.
    pub fn in_use(&self) -> usize {
        self.created.len() - self.available.len()
    }

    /// Every instance this pool has ever constructed. Monotonically
    /// non-decreasing: pools grow lazily and never shrink before teardown.
    pub fn total_created(&self) -> usize {
        self.created.len()
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.created.contains(&entity)
    }

    fn create(&mut self, commands: &mut Commands) -> Entity {
        let entity = (self.prefab)(commands, self.id);
        self.created.push(entity);
        entity
    }
}

/// All entity pools, keyed by [`PoolId`].
///
/// Acquire and release are only ever called from the single simulation
/// thread; the world's exclusive access rules are the mutual-exclusion
/// boundary.
#[derive(Resource, Default)]
pub struct Pools {
    pools: Vec<EntityPool>,
}

impl Pools {
    /// Creates a pool and populates it with `size` dormant instances.
    pub fn create(&mut self, label: &'static str, size: usize, prefab: Prefab, commands: &mut Commands) -> PoolId {
        let id = self.pools.len();
        let mut pool = EntityPool {
            id,
            label,
            prefab,
            available: Vec::with_capacity(size),
            created: Vec::with_capacity(size),
            initial_size: size,
        };
        for _ in 0..size {
            let entity = pool.create(commands);
            pool.available.push(entity);
        }
        debug!(pool = label, size, "Populated pool");
        self.pools.push(pool);
        id
    }

    pub fn get(&self, id: PoolId) -> &EntityPool {
        &self.pools[id]
    }

    /// Hands out a dormant instance, marking it active. Never fails: an
    /// empty pool grows by one instance instead of stalling gameplay.
    pub fn acquire(&mut self, id: PoolId, commands: &mut Commands) -> Entity {
        let pool = &mut self.pools[id];
        let entity = match pool.available.pop() {
            Some(entity) => entity,
            None => {
                let entity = pool.create(commands);
                info!(
                    pool = pool.label,
                    total = pool.created.len(),
                    initial = pool.initial_size,
                    "Pool exhausted, growing"
                );
                entity
            }
        };
        commands.entity(entity).remove::<Dormant>();
        entity
    }

    /// Marks an instance inactive and makes it eligible for reuse.
    ///
    /// Safe against double release from overlapping teardown paths: a
    /// release of an already-available instance is a logged no-op.
    pub fn release(&mut self, id: PoolId, entity: Entity, commands: &mut Commands) {
        let pool = &mut self.pools[id];
        if pool.available.contains(&entity) {
            warn!(pool = pool.label, ?entity, "Released an instance that is already pooled");
            return;
        }
        if !pool.created.contains(&entity) {
            warn!(pool = pool.label, ?entity, "Released an instance this pool never created");
            return;
        }
        commands.entity(entity).insert(Dormant);
        pool.available.push(entity);
    }

    /// Destroys every instance ever created by every pool. Any outstanding
    /// `Entity` ids become invalid; callers must not use them afterwards.
    pub fn teardown(&mut self, world: &mut World) {
        for pool in self.pools.drain(..) {
            info!(pool = pool.label, total = pool.created.len(), "Tearing down pool");
            for entity in pool.created {
                world.despawn(entity);
            }
        }
    }

    /// Deferred-friendly variant of [`Pools::teardown`] for use inside
    /// systems, where despawns go through `Commands`.
    pub fn teardown_deferred(&mut self, commands: &mut Commands) {
        for pool in self.pools.drain(..) {
            info!(pool = pool.label, total = pool.created.len(), "Tearing down pool");
            for entity in pool.created {
                commands.entity(entity).despawn();
            }
        }
    }
}
