//! The controller object: one owner for the canonical target point and the
//! particle pool.  Input samples and the frame tick are the only ways in;
//! the renderer reads through shared borrows.

use crate::fusion::{InputFusion, Sample, TargetPoint};
use crate::particle::{EngineConfig, ParticleEngine};

pub struct Scene {
    fusion: InputFusion,
    engine: ParticleEngine,
}

impl Scene {
    /// A scene whose target starts at the centre of a `width × height`
    /// surface.
    pub fn new(cfg: EngineConfig, width: usize, height: usize) -> Self {
        Scene {
            fusion: InputFusion::centered(width, height),
            engine: ParticleEngine::new(cfg),
        }
    }

    pub fn seeded(cfg: EngineConfig, width: usize, height: usize, seed: u64) -> Self {
        Scene {
            fusion: InputFusion::centered(width, height),
            engine: ParticleEngine::seeded(cfg, seed),
        }
    }

    /// Route one input message to the fusion controller.
    pub fn apply(&mut self, sample: Sample) {
        let before = self.fusion.source();
        self.fusion.apply(sample);
        let after = self.fusion.source();
        if before != after {
            tracing::debug!(?before, ?after, "target source changed");
        }
    }

    /// One simulation tick around the current target.
    pub fn step(&mut self) {
        let target = self.fusion.position();
        self.engine.tick(target);
    }

    pub fn target(&self) -> TargetPoint       { self.fusion.target() }
    pub fn engine(&self) -> &ParticleEngine   { &self.engine }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fusion::Source;
    use glam::Vec2;

    #[test]
    fn particles_spawn_around_the_fused_target() {
        let mut scene = Scene::seeded(EngineConfig::default(), 1000, 1000, 1);
        scene.apply(Sample::Tracked { x: 100.0, y: 900.0 });
        scene.step();
        for p in scene.engine().particles() {
            assert!(p.pos.distance(Vec2::new(100.0, 900.0)) < 34.0);
        }
    }

    #[test]
    fn ignored_manual_sample_does_not_move_spawns() {
        let mut scene = Scene::seeded(EngineConfig::default(), 1000, 1000, 1);
        scene.apply(Sample::Tracked { x: 200.0, y: 200.0 });
        scene.apply(Sample::Manual  { x: 800.0, y: 800.0 });
        assert_eq!(scene.target().source, Source::Tracked);
        scene.step();
        assert!(scene.engine().particles().iter()
            .all(|p| p.pos.distance(Vec2::new(200.0, 200.0)) < 34.0));
    }

    #[test]
    fn old_particles_stay_put_when_target_jumps() {
        let mut scene = Scene::seeded(EngineConfig::default(), 1000, 1000, 9);
        scene.step();
        let first: Vec<_> = scene.engine().particles().to_vec();
        scene.apply(Sample::Manual { x: 10.0, y: 10.0 });
        scene.step();
        for old in &first {
            let now = scene.engine().particles().iter().find(|p| p.id == old.id).unwrap();
            assert!((now.pos - (old.pos + old.vel)).length() < 1e-4);
        }
    }
}
