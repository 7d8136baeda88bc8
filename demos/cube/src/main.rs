use orbit_scenes::{
    flow,
    scenes::cube::{CubeConfig, CubeFlow},
};

fn main() -> anyhow::Result<()> {
    flow::run(CubeFlow::new(CubeConfig::default()))
}
