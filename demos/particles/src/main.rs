use orbit_scenes::{
    flow,
    scenes::particles::{ParticlesConfig, ParticlesFlow},
};

fn main() -> anyhow::Result<()> {
    // Particle count can be overridden for quick experiments: `particles 2000`
    let mut config = ParticlesConfig::default();
    if let Some(count) = std::env::args().nth(1) {
        config.count = count.parse()?;
    }
    flow::run(ParticlesFlow::new(config))
}
