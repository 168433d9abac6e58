//! Stage spawner and per-stage index lists

use glam::Vec2;

use super::entity::{
    ActorState, Entity, EntityKind, EntityType, Facing, IdAllocator, Transform,
};
use crate::consts::*;
use crate::stage::CompiledStage;

/// Arena indices grouped by role, rebuilt whenever the arena changes shape
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub actor: Option<usize>,
    pub boss: Option<usize>,
    /// Actor and hazards, in arena order
    pub dynamic: Vec<usize>,
    pub platforms: Vec<usize>,
    pub hazards: Vec<usize>,
    pub gates: Vec<usize>,
}

impl Partition {
    pub fn build(entities: &[Entity]) -> Self {
        let mut partition = Self::default();
        for (i, entity) in entities.iter().enumerate() {
            let tag = entity.tag();
            if tag.is_dynamic() {
                partition.dynamic.push(i);
            }
            match tag {
                EntityType::Actor => partition.actor = partition.actor.or(Some(i)),
                EntityType::Boss => partition.boss = partition.boss.or(Some(i)),
                EntityType::Hazard => partition.hazards.push(i),
                EntityType::Platform => partition.platforms.push(i),
                EntityType::LadderGate => partition.gates.push(i),
                _ => {}
            }
        }
        partition
    }
}

/// Build the full entity set for a stage
///
/// Order: actor, boss, special item, platforms, ladders, ladder gates, rivets.
/// Platforms keep the stage's solid order.
pub fn spawn_stage_entities(stage: &CompiledStage, ids: &mut IdAllocator) -> Vec<Entity> {
    let mut entities = Vec::with_capacity(
        3 + stage.solids.len() + stage.ladders.len() + stage.ladder_gates.len() + stage.rivets.len(),
    );

    entities.push(spawn_actor(ids, stage.spawns.actor));

    let boss = stage.spawns.boss;
    entities.push(Entity::new(
        ids.next_id(),
        EntityKind::Boss,
        Transform::new(boss.x, boss.y, BOSS_SIZE.0, BOSS_SIZE.1),
    ));

    if let Some(item) = stage.spawns.special {
        entities.push(Entity::new(
            ids.next_id(),
            EntityKind::Item,
            Transform::new(item.x, item.y, ITEM_SIZE.0, ITEM_SIZE.1),
        ));
    }

    for solid in &stage.solids {
        entities.push(Entity::new(
            ids.next_id(),
            EntityKind::Platform,
            Transform::new(solid.x, solid.y, solid.w, solid.h),
        ));
    }

    for ladder in &stage.ladders {
        entities.push(Entity::new(
            ids.next_id(),
            EntityKind::Ladder,
            Transform::new(ladder.x, ladder.y, LADDER_WIDTH, ladder.h),
        ));
    }

    for gate in &stage.ladder_gates {
        entities.push(Entity::new(
            ids.next_id(),
            EntityKind::LadderGate {
                center_x: gate.center_x,
            },
            Transform::new(gate.x, gate.y, gate.w, gate.h),
        ));
    }

    for rivet in &stage.rivets {
        entities.push(Entity::new(
            ids.next_id(),
            EntityKind::Rivet,
            Transform::new(rivet.x, rivet.y, RIVET_SIZE.0, RIVET_SIZE.1),
        ));
    }

    entities
}

pub fn spawn_actor(ids: &mut IdAllocator, at: Vec2) -> Entity {
    Entity::new(
        ids.next_id(),
        EntityKind::Actor {
            state: ActorState::Idle,
            climbing: false,
        },
        Transform::new(at.x, at.y, ACTOR_SIZE.0, ACTOR_SIZE.1),
    )
}

pub fn spawn_hazard(ids: &mut IdAllocator, at: Vec2, facing: Facing) -> Entity {
    Entity::new(
        ids.next_id(),
        EntityKind::Hazard { facing },
        Transform::new(at.x, at.y, HAZARD_SIZE.0, HAZARD_SIZE.1),
    )
}
