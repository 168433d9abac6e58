//! Fixed timestep simulation tick
//!
//! One call advances the world by exactly one step. Order within a tick:
//! boss release, entity updates, platform collision pass, ladder gates, death
//! check, clear check. Respawning on death/clear is the caller's job.

use std::collections::HashSet;

use glam::Vec2;

use super::aabb::Aabb;
use super::collision::resolve;
use super::entity::{ActorState, Entity, EntityId, EntityKind, collision_handler, update};
use super::grid::SpatialGrid;
use super::world::World;
use crate::input::{Control, InputState};
use crate::tuning::Tuning;

/// What the tick decided about the stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    /// Actor touched a hazard
    ActorDied,
    /// Actor reached the goal height
    StageCleared,
}

/// Advance the world by one fixed timestep
pub fn tick(world: &mut World, input: &InputState, tuning: &Tuning, dt: f32) -> TickOutcome {
    world.tick_count += 1;
    world.tick_hazard_release(tuning);

    for entity in &mut world.entities {
        let before = entity.transform;
        update(entity, input, tuning, dt);
        if !entity.transform.is_finite() {
            log::warn!(
                "{:?} {:?} left the number line; restoring last position",
                entity.tag(),
                entity.id
            );
            entity.transform = before;
            entity.transform.vel = Vec2::ZERO;
        }
    }

    resolve_platform_contacts(world);
    rebuild_overlap_grid(world);
    engage_ladders(world, input, tuning);

    let Some(actor_idx) = world.partition.actor else {
        return TickOutcome::Continue;
    };
    let actor_box = world.entities[actor_idx].aabb();

    if overlapping(world, &world.partition.hazards, &actor_box).is_some() {
        if let EntityKind::Actor { state, .. } = &mut world.entities[actor_idx].kind {
            *state = ActorState::Dead;
        }
        log::info!("Actor died on tick {}", world.tick_count);
        return TickOutcome::ActorDied;
    }

    if actor_box.pos.y < tuning.goal_y {
        log::info!("Stage cleared on tick {}", world.tick_count);
        return TickOutcome::StageCleared;
    }

    world.drop_escaped_hazards();
    TickOutcome::Continue
}

/// Push every dynamic entity out of the platforms it sank into
///
/// Platforms are visited once each in stage order, so with several
/// simultaneous contacts the final position depends on that order. The
/// broad-phase candidate set grows after every push-out, so a platform later
/// in the list is still tested when an earlier contact moved the mover onto it.
fn resolve_platform_contacts(world: &mut World) {
    let World {
        entities,
        partition,
        solid_grid,
        ..
    } = world;

    fill_grid(solid_grid, entities, &partition.platforms);

    for &mover_idx in &partition.dynamic {
        entities[mover_idx].transform.grounded = false;

        let mut candidates = nearby_platforms(solid_grid, &entities[mover_idx].aabb());
        if candidates.is_empty() {
            continue;
        }

        let handler = collision_handler(entities[mover_idx].tag());

        for &solid_idx in &partition.platforms {
            if !candidates.contains(&entities[solid_idx].id) {
                continue;
            }
            let solid = entities[solid_idx].aabb();
            let mover = &mut entities[mover_idx];

            let mut body = mover.aabb();
            let pre_y = body.pos.y;
            let contact = resolve(&mut body, &solid);
            if !contact.collided {
                continue;
            }

            if contact.normal.x != 0.0 {
                body.pos.x = snap(body.pos.x);
            } else {
                body.pos.y = snap(body.pos.y);
            }
            mover.transform.pos = body.pos;
            // The push-out may have carried the mover onto platforms further down the list
            candidates.extend(nearby_platforms(solid_grid, &body));

            if contact.normal.y < 0.0 && body.pos.y <= pre_y {
                mover.transform.grounded = true;
            }

            if let Some(handler) = handler {
                handler(mover, contact.normal);
            }
        }

        let t = &mut entities[mover_idx].transform;
        if t.grounded && t.vel.y > 0.0 {
            t.vel.y = 0.0;
        }
    }
}

/// Platform ids near `body`, padded by its own size
fn nearby_platforms(grid: &SpatialGrid, body: &Aabb) -> HashSet<EntityId> {
    let probe = body.inflate(body.size);
    grid.query(probe.pos.x, probe.pos.y, probe.size.x, probe.size.y)
        .into_iter()
        .collect()
}

fn rebuild_overlap_grid(world: &mut World) {
    world.overlap_grid.clear();
    for &i in world.partition.hazards.iter().chain(&world.partition.gates) {
        let b = world.entities[i].aabb();
        world
            .overlap_grid
            .insert(world.entities[i].id, b.pos.x, b.pos.y, b.size.x, b.size.y);
    }
}

/// Attach to or detach from ladders
///
/// Engagement only needs a vertical control held while overlapping a gate;
/// releasing both vertical controls always detaches.
fn engage_ladders(world: &mut World, input: &InputState, tuning: &Tuning) {
    let Some(actor_idx) = world.partition.actor else {
        return;
    };
    let actor_box = world.entities[actor_idx].aabb();
    let gate_center = overlapping(world, &world.partition.gates, &actor_box).and_then(|i| {
        match world.entities[i].kind {
            EntityKind::LadderGate { center_x } => Some(center_x),
            _ => None,
        }
    });
    let vertical = input.is_down(&[Control::Up, Control::Down]);

    let actor = &mut world.entities[actor_idx];
    if let EntityKind::Actor { climbing, .. } = &mut actor.kind {
        if !vertical {
            *climbing = false;
        } else if let Some(center_x) = gate_center {
            *climbing = true;
            actor.transform.vel.x = 0.0;
            if tuning.snap_to_gate_center {
                actor.transform.pos.x = center_x as f32 - actor.transform.size.x / 2.0;
            }
        }
    }
}

/// First entity in `indices` (in list order) whose box overlaps `probe`
fn overlapping(world: &World, indices: &[usize], probe: &Aabb) -> Option<usize> {
    let candidates: HashSet<EntityId> = world
        .overlap_grid
        .query(probe.pos.x, probe.pos.y, probe.size.x, probe.size.y)
        .into_iter()
        .collect();
    indices.iter().copied().find(|&i| {
        let e = &world.entities[i];
        candidates.contains(&e.id) && e.aabb().intersects(probe)
    })
}

fn fill_grid(grid: &mut SpatialGrid, entities: &[Entity], indices: &[usize]) {
    grid.clear();
    for &i in indices {
        let b = entities[i].aabb();
        grid.insert(entities[i].id, b.pos.x, b.pos.y, b.size.x, b.size.y);
    }
}

/// Round to the nearest whole pixel, halves upward
#[inline]
fn snap(v: f32) -> f32 {
    (v + 0.5).floor()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::consts::SIM_DT;
    use crate::sim::entity::{Facing, Transform};
    use crate::stage::{CompiledStage, parse_stage};

    /// Floor at y=100, a wall standing on it at x=100, one gate at x=20..36
    fn test_stage() -> Arc<CompiledStage> {
        Arc::new(
            parse_stage(
                r#"{
                    "size": { "w": 200, "h": 120 },
                    "solids": [[0, 100, 200, 10], [100, 60, 10, 40]],
                    "ladders": [[24, 40, 60]],
                    "ladderGates": [[20, 84, 16, 16]],
                    "spawns": { "hero": [50, 84], "gorilla": [160, 0] }
                }"#,
            )
            .unwrap(),
        )
    }

    fn girders() -> Arc<CompiledStage> {
        Arc::new(parse_stage(include_str!("../../stages/girders.json")).unwrap())
    }

    fn quiet() -> Tuning {
        Tuning::without_hazard_release()
    }

    fn step(world: &mut World, input: &InputState) -> TickOutcome {
        tick(world, input, &quiet(), SIM_DT)
    }

    fn actor(world: &World) -> &Entity {
        world.actor().unwrap()
    }

    #[test]
    fn test_actor_lands_and_stays_grounded() {
        let mut world = World::new(test_stage(), 1, &quiet());

        for _ in 0..10 {
            assert_eq!(step(&mut world, &InputState::NONE), TickOutcome::Continue);
            let t = actor(&world).transform;
            assert!(t.grounded);
            assert_eq!(t.vel.y, 0.0);
            assert_eq!(t.pos.y, 84.0);
        }
        assert_eq!(actor(&world).actor_state(), Some(ActorState::Idle));
    }

    #[test]
    fn test_actor_falls_onto_floor() {
        let mut world = World::new(test_stage(), 1, &quiet());
        world.actor_mut().unwrap().transform.pos.y = 40.0;

        let mut landed_at = None;
        for n in 0..120 {
            step(&mut world, &InputState::NONE);
            if actor(&world).transform.grounded {
                landed_at = Some(n);
                break;
            }
            assert_eq!(actor(&world).actor_state(), Some(ActorState::Falling));
        }
        assert!(landed_at.is_some());
        let t = actor(&world).transform;
        assert_eq!(t.pos.y, 84.0);
        assert_eq!(t.vel.y, 0.0);
    }

    #[test]
    fn test_jump_leaves_ground() {
        let mut world = World::new(test_stage(), 1, &quiet());
        step(&mut world, &InputState::NONE);

        step(&mut world, &InputState::holding(&[Control::Jump]));
        let t = actor(&world).transform;
        assert!(!t.grounded);
        assert!(t.pos.y < 84.0);
        assert_eq!(actor(&world).actor_state(), Some(ActorState::Rising));
    }

    #[test]
    fn test_push_out_reaches_later_platforms() {
        let stage = Arc::new(
            parse_stage(
                r#"{
                    "size": { "w": 200, "h": 240 },
                    "solids": [[20, 0, 100, 200], [130, 0, 10, 200]],
                    "ladders": [],
                    "ladderGates": [],
                    "spawns": { "hero": [160, 200], "gorilla": [180, 0] }
                }"#,
            )
            .unwrap(),
        );
        let mut world = World::new(stage, 1, &quiet());
        let id = world.spawn(
            EntityKind::Hazard {
                facing: Facing::Left,
            },
            Transform::new(100.0, 50.0, 12.0, 16.0),
        );

        assert_eq!(step(&mut world, &InputState::NONE), TickOutcome::Continue);

        // Pushed right out of the first solid to x=120, then back by the second
        let hazard = world.entity(id).unwrap();
        assert_eq!(hazard.transform.pos.x, 118.0);
        assert_eq!(hazard.facing(), Some(Facing::Left));
        let second = Aabb::new(130.0, 0.0, 10.0, 200.0);
        assert!(!hazard.aabb().intersects(&second));
    }

    #[test]
    fn test_actor_is_stopped_by_wall() {
        let mut world = World::new(test_stage(), 1, &quiet());
        world.actor_mut().unwrap().transform.pos.x = 87.0;

        for _ in 0..30 {
            step(&mut world, &InputState::holding(&[Control::Right]));
        }
        let t = actor(&world).transform;
        assert_eq!(t.pos.x, 88.0);
        assert!(t.grounded);
    }

    #[test]
    fn test_hazard_reverses_once_at_wall() {
        let mut world = World::new(test_stage(), 1, &quiet());
        // Keep the actor well away
        world.actor_mut().unwrap().transform.pos.x = 0.0;
        let id = world.spawn(
            EntityKind::Hazard {
                facing: Facing::Right,
            },
            Transform::new(87.5, 88.0, 12.0, 12.0),
        );

        let mut flips = 0;
        let mut facing = Facing::Right;
        for _ in 0..30 {
            step(&mut world, &InputState::NONE);
            let now = world.entity(id).unwrap().facing().unwrap();
            if now != facing {
                flips += 1;
                facing = now;
            }
        }
        assert_eq!(flips, 1);
        assert_eq!(facing, Facing::Left);
        let hazard = world.entity(id).unwrap();
        assert!(hazard.transform.pos.x < 88.0);
        assert!(hazard.transform.grounded || hazard.transform.pos.y <= 88.0);
    }

    #[test]
    fn test_hazard_contact_kills_once() {
        let mut world = World::new(test_stage(), 1, &quiet());
        let at = actor(&world).transform.pos;
        world.spawn(
            EntityKind::Hazard {
                facing: Facing::Left,
            },
            Transform::new(at.x + 2.0, at.y + 2.0, 12.0, 12.0),
        );
        world.spawn(
            EntityKind::Hazard {
                facing: Facing::Right,
            },
            Transform::new(at.x - 2.0, at.y + 2.0, 12.0, 12.0),
        );

        assert_eq!(step(&mut world, &InputState::NONE), TickOutcome::ActorDied);
        assert_eq!(actor(&world).actor_state(), Some(ActorState::Dead));
    }

    #[test]
    fn test_reaching_goal_clears_stage() {
        let mut world = World::new(test_stage(), 1, &quiet());
        world.actor_mut().unwrap().transform.pos = Vec2::new(60.0, 5.0);

        assert_eq!(step(&mut world, &InputState::NONE), TickOutcome::StageCleared);
    }

    #[test]
    fn test_gate_engages_and_releases_climbing() {
        let mut world = World::new(test_stage(), 1, &quiet());
        world.actor_mut().unwrap().transform.pos.x = 22.0;
        step(&mut world, &InputState::NONE);

        step(&mut world, &InputState::holding(&[Control::Up, Control::Right]));
        assert!(actor(&world).is_climbing());
        assert_eq!(actor(&world).transform.vel.x, 0.0);

        let y = actor(&world).transform.pos.y;
        step(&mut world, &InputState::holding(&[Control::Up]));
        assert!(actor(&world).transform.pos.y < y);
        assert_eq!(actor(&world).actor_state(), Some(ActorState::Climbing));

        step(&mut world, &InputState::NONE);
        assert!(!actor(&world).is_climbing());
    }

    #[test]
    fn test_vertical_input_off_gate_does_not_climb() {
        let mut world = World::new(test_stage(), 1, &quiet());
        step(&mut world, &InputState::holding(&[Control::Up]));
        assert!(!actor(&world).is_climbing());
    }

    #[test]
    fn test_snap_to_gate_center() {
        let tuning = Tuning {
            snap_to_gate_center: true,
            ..quiet()
        };
        let mut world = World::new(test_stage(), 1, &tuning);
        world.actor_mut().unwrap().transform.pos.x = 30.0;

        tick(&mut world, &InputState::holding(&[Control::Down]), &tuning, SIM_DT);
        let a = actor(&world);
        assert!(a.is_climbing());
        // Gate center is 28
        assert_eq!(a.transform.pos.x, 22.0);
    }

    #[test]
    fn test_non_finite_entity_is_recovered() {
        let mut world = World::new(test_stage(), 1, &quiet());
        world.actor_mut().unwrap().transform.vel.y = f32::NAN;

        assert_eq!(step(&mut world, &InputState::NONE), TickOutcome::Continue);
        let t = actor(&world).transform;
        assert!(t.is_finite());
        assert_eq!(t.pos, Vec2::new(50.0, 84.0));
    }

    #[test]
    fn test_static_entities_never_move() {
        let mut world = World::new(test_stage(), 1, &quiet());
        let statics: Vec<_> = world
            .entities()
            .iter()
            .filter(|e| !e.tag().is_dynamic())
            .cloned()
            .collect();
        for _ in 0..20 {
            step(&mut world, &InputState::holding(&[Control::Left]));
        }
        for e in statics {
            assert_eq!(world.entity(e.id).unwrap().transform, e.transform);
        }
    }

    #[test]
    fn test_bundled_stage_first_ladder_climbs_to_girder() {
        let mut world = World::new(girders(), 1, &quiet());
        // Foot of the first ladder, against the left wall
        world.actor_mut().unwrap().transform.pos = Vec2::new(0.0, 232.0);
        step(&mut world, &InputState::NONE);
        assert!(actor(&world).transform.grounded);

        let up = InputState::holding(&[Control::Up]);
        for _ in 0..100 {
            step(&mut world, &up);
        }
        assert!(actor(&world).is_climbing());
        assert!(actor(&world).transform.pos.y < 184.0);

        // The girder above the next ladder is the ceiling
        for _ in 0..100 {
            step(&mut world, &up);
        }
        assert_eq!(actor(&world).transform.pos.y, 160.0);

        let right = InputState::holding(&[Control::Right]);
        for _ in 0..40 {
            step(&mut world, &right);
        }
        let t = actor(&world).transform;
        assert!(!actor(&world).is_climbing());
        assert!(t.grounded);
        assert_eq!(t.pos.y, 184.0);
        assert!(t.pos.x > 4.0);
    }

    #[test]
    fn test_bundled_stage_turns_hazards_back_toward_actor() {
        let mut world = World::new(girders(), 1, &quiet());
        step(&mut world, &InputState::NONE);
        // Rolling off the left end of the first girder
        world.spawn(
            EntityKind::Hazard {
                facing: Facing::Left,
            },
            Transform::new(20.0, 188.0, 12.0, 12.0),
        );

        let died = (0..400).any(|_| step(&mut world, &InputState::NONE) == TickOutcome::ActorDied);
        assert!(died);
    }

    #[test]
    fn test_determinism() {
        let stage = girders();
        let tuning = Tuning::default();
        let mut a = World::new(stage.clone(), 99999, &tuning);
        let mut b = World::new(stage, 99999, &tuning);

        let inputs = [
            InputState::holding(&[Control::Right]),
            InputState::holding(&[Control::Right, Control::Jump]),
            InputState::NONE,
            InputState::holding(&[Control::Up]),
        ];

        for n in 0..600 {
            let input = &inputs[(n / 40) % inputs.len()];
            let oa = tick(&mut a, input, &tuning, SIM_DT);
            let ob = tick(&mut b, input, &tuning, SIM_DT);
            assert_eq!(oa, ob);
            if oa != TickOutcome::Continue {
                a.respawn(&tuning);
                b.respawn(&tuning);
            }
        }

        assert_eq!(a.entities(), b.entities());
        assert_eq!(a.ticks(), 600);
    }
}
