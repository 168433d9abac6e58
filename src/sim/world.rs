//! Live simulation state for one stage

use std::sync::Arc;

use glam::Vec2;

use super::entity::{Entity, EntityId, EntityKind, Facing, IdAllocator, Transform};
use super::grid::SpatialGrid;
use super::rng::SequenceGenerator;
use super::spawn::{Partition, spawn_hazard, spawn_stage_entities};
use crate::stage::CompiledStage;
use crate::tuning::Tuning;

/// Entity arena plus everything a tick needs besides input and tuning
///
/// The compiled stage is shared; the world only reads it. Entities are rebuilt
/// wholesale by [`World::respawn`]; ids keep counting across rebuilds.
pub struct World {
    stage: Arc<CompiledStage>,
    seed: u64,
    pub(crate) entities: Vec<Entity>,
    pub(crate) partition: Partition,
    ids: IdAllocator,
    pub(crate) rng: SequenceGenerator,
    /// Ticks until the boss releases the next hazard
    pub(crate) hazard_timer: u32,
    /// Platforms, refilled every tick for the collision pass
    pub(crate) solid_grid: SpatialGrid,
    /// Hazards and gates, refilled every tick for overlap checks
    pub(crate) overlap_grid: SpatialGrid,
    pub(crate) tick_count: u64,
}

impl World {
    /// Spawn a fresh world for `stage`
    pub fn new(stage: Arc<CompiledStage>, seed: u64, tuning: &Tuning) -> Self {
        let mut world = Self {
            stage,
            seed,
            entities: Vec::new(),
            partition: Partition::default(),
            ids: IdAllocator::default(),
            rng: SequenceGenerator::new(seed),
            hazard_timer: 0,
            solid_grid: SpatialGrid::new(tuning.grid_cell_size),
            overlap_grid: SpatialGrid::new(tuning.grid_cell_size),
            tick_count: 0,
        };
        world.respawn(tuning);
        world
    }

    /// Throw away every entity and rebuild from the stage
    pub fn respawn(&mut self, tuning: &Tuning) {
        self.entities = spawn_stage_entities(&self.stage, &mut self.ids);
        self.partition = Partition::build(&self.entities);
        self.rng.reseed(self.seed);
        self.hazard_timer = self.next_hazard_interval(tuning);
        self.solid_grid.clear();
        self.overlap_grid.clear();
        log::info!(
            "Spawned {} entities (ids from {})",
            self.entities.len(),
            self.entities.first().map(|e| e.id.0).unwrap_or_default()
        );
    }

    pub fn stage(&self) -> &Arc<CompiledStage> {
        &self.stage
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn ticks(&self) -> u64 {
        self.tick_count
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn partition(&self) -> &Partition {
        &self.partition
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.iter().find(|e| e.id == id)
    }

    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.iter_mut().find(|e| e.id == id)
    }

    pub fn actor(&self) -> Option<&Entity> {
        self.partition.actor.map(|i| &self.entities[i])
    }

    pub fn actor_mut(&mut self) -> Option<&mut Entity> {
        self.partition.actor.map(|i| &mut self.entities[i])
    }

    /// Add an entity between rebuilds
    pub fn spawn(&mut self, kind: EntityKind, transform: Transform) -> EntityId {
        let id = self.ids.next_id();
        self.entities.push(Entity::new(id, kind, transform));
        self.partition = Partition::build(&self.entities);
        id
    }

    /// Boss hazard release, called once per tick before entity updates
    pub(crate) fn tick_hazard_release(&mut self, tuning: &Tuning) {
        if !tuning.boss_releases_hazards {
            return;
        }
        if self.hazard_timer > 0 {
            self.hazard_timer -= 1;
            return;
        }

        if self.partition.hazards.len() < tuning.max_hazards {
            if let Some(boss) = self.partition.boss.map(|i| self.entities[i].transform) {
                // Drop from the boss's leading edge so the new hazard starts clear of it
                let at = Vec2::new(boss.pos.x + boss.size.x, boss.pos.y);
                let hazard = spawn_hazard(&mut self.ids, at, Facing::Right);
                log::debug!("Boss released hazard {:?} at {:?}", hazard.id, at);
                self.entities.push(hazard);
                self.partition = Partition::build(&self.entities);
            }
        }
        self.hazard_timer = self.next_hazard_interval(tuning);
    }

    /// Remove hazards that have fallen out of the stage
    pub(crate) fn drop_escaped_hazards(&mut self) {
        let floor = self.stage.height;
        let before = self.entities.len();
        self.entities.retain(|e| {
            !(matches!(e.kind, EntityKind::Hazard { .. }) && e.transform.pos.y > floor)
        });
        if self.entities.len() != before {
            log::debug!("Dropped {} escaped hazards", before - self.entities.len());
            self.partition = Partition::build(&self.entities);
        }
    }

    fn next_hazard_interval(&mut self, tuning: &Tuning) -> u32 {
        self.rng
            .range_inclusive(tuning.hazard_interval_min, tuning.hazard_interval_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityType;
    use crate::stage::parse_stage;

    fn girders() -> Arc<CompiledStage> {
        Arc::new(parse_stage(include_str!("../../stages/girders.json")).unwrap())
    }

    fn hazards(world: &World) -> Vec<&Entity> {
        world
            .entities()
            .iter()
            .filter(|e| e.tag() == EntityType::Hazard)
            .collect()
    }

    #[test]
    fn test_respawn_rebuilds_with_fresh_ids() {
        let tuning = Tuning::without_hazard_release();
        let mut world = World::new(girders(), 1, &tuning);
        let count = world.entities().len();
        let first_actor = world.actor().unwrap().id;

        world.respawn(&tuning);
        assert_eq!(world.entities().len(), count);
        let actor = world.actor().unwrap();
        assert!(actor.id > first_actor);
        assert_eq!(actor.transform.pos, world.stage().spawns.actor);
    }

    #[test]
    fn test_spawn_updates_partition() {
        let tuning = Tuning::without_hazard_release();
        let mut world = World::new(girders(), 1, &tuning);
        let id = world.spawn(
            EntityKind::Hazard { facing: Facing::Left },
            Transform::new(0.0, 0.0, 12.0, 12.0),
        );
        assert_eq!(world.partition().hazards.len(), 1);
        assert_eq!(world.entity(id).unwrap().facing(), Some(Facing::Left));
    }

    #[test]
    fn test_boss_releases_on_timer_up_to_cap() {
        let tuning = Tuning {
            hazard_interval_min: 2,
            hazard_interval_max: 2,
            max_hazards: 2,
            ..Tuning::default()
        };
        let mut world = World::new(girders(), 3, &tuning);
        assert_eq!(world.hazard_timer, 2);

        for _ in 0..3 {
            world.tick_hazard_release(&tuning);
        }
        assert_eq!(hazards(&world).len(), 1);
        let boss = world.entities()[world.partition().boss.unwrap()].transform;
        assert_eq!(hazards(&world)[0].transform.pos.y, boss.pos.y);

        for _ in 0..9 {
            world.tick_hazard_release(&tuning);
        }
        assert_eq!(hazards(&world).len(), 2);
    }

    #[test]
    fn test_release_timing_is_seeded() {
        let tuning = Tuning::default();
        let a = World::new(girders(), 1234, &tuning);
        let b = World::new(girders(), 1234, &tuning);
        assert_eq!(a.hazard_timer, b.hazard_timer);
        assert!((tuning.hazard_interval_min..=tuning.hazard_interval_max).contains(&a.hazard_timer));
    }

    #[test]
    fn test_escaped_hazards_are_dropped() {
        let tuning = Tuning::without_hazard_release();
        let mut world = World::new(girders(), 1, &tuning);
        let below = world.stage().height + 1.0;
        world.spawn(
            EntityKind::Hazard { facing: Facing::Right },
            Transform::new(10.0, below, 12.0, 12.0),
        );
        world.spawn(
            EntityKind::Hazard { facing: Facing::Right },
            Transform::new(10.0, 10.0, 12.0, 12.0),
        );

        world.drop_escaped_hazards();
        assert_eq!(world.partition().hazards.len(), 1);
        assert!(world.actor().is_some());
    }
}
