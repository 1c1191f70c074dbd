use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Parser;
use ovo_scene::{
    Matrix4, SquareMatrix, Vector3,
    config::EngineConfig,
    context::Context,
    data_structures::scene_graph::{NodeId, NodeKind},
    render::NullDriver,
    scene::Scene,
};

#[derive(Parser)]
#[command(name = "ovo-info")]
#[command(about = "Print the hierarchy, materials and frame statistics of an OVO scene")]
#[command(version)]
struct Cli {
    /// Scene file (.ovo)
    file: PathBuf,

    /// Directory texture file names are resolved against
    #[arg(short, long)]
    texture_dir: Option<PathBuf>,

    /// Engine configuration (.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logger(config: &EngineConfig) {
    let mut builder = env_logger::Builder::new();
    match &config.log_filter {
        Some(filter) if std::env::var_os("RUST_LOG").is_none() => {
            builder.parse_filters(filter);
        }
        _ => {
            builder.parse_default_env();
        }
    }
    if let Err(e) = builder.try_init() {
        println!("Warning: Could not initialize logger: {}", e);
    };
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => EngineConfig::load_from_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(dir) = cli.texture_dir {
        config.texture_dir = dir;
    }
    init_logger(&config);

    let mut ctx = Context::new(config);
    let mut scene = ctx.load_scene(&cli.file)?;

    println!("Hierarchy:");
    print_node(&scene, scene.root, 1);

    println!("Materials:");
    for (id, material) in scene.materials.iter() {
        let texture = material
            .texture()
            .map(|t| t.file_path().display().to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "  #{} {:<24} opacity {:.2} shininess {:>6.1} texture {}",
            id.0,
            material.name(),
            material.transparency(),
            material.shininess(),
            texture
        );
    }

    let stats = scene.stats();
    println!(
        "Nodes: {} ({} groups, {} meshes, {} lights, {} cameras)",
        stats.nodes, stats.groups, stats.meshes, stats.lights, stats.cameras
    );
    println!("Geometry: {} vertices, {} faces", stats.vertices, stats.faces);

    let mut driver = NullDriver::default();
    let uploaded = scene.upload_textures(&mut driver);
    println!("Textures decoded: {uploaded}");

    let frame = ctx.render_frame_with_view(&scene, Matrix4::identity(), &mut driver);
    println!(
        "Frame: {} lights ({} dropped), {} opaque, {} transparent",
        frame.lights,
        frame.dropped_lights.len(),
        frame.opaque,
        frame.transparent
    );
    Ok(())
}

fn print_node(scene: &Scene, id: NodeId, depth: usize) {
    let node = &scene.graph[id];
    let kind = match node.kind() {
        NodeKind::Group => "group".to_string(),
        NodeKind::Mesh(mesh) => {
            let material = mesh
                .material()
                .and_then(|m| scene.materials.get(m))
                .map(|m| m.name())
                .unwrap_or("none");
            format!(
                "mesh, {} vertices, {} faces, material {material}",
                mesh.vertices().len(),
                mesh.faces().len()
            )
        }
        NodeKind::Light(light) => format!("light {:?}", light.kind()),
        NodeKind::Camera(_) => "camera".to_string(),
    };
    let position = scene
        .graph
        .world_matrix(id)
        .map(|m| m.w.truncate())
        .unwrap_or(Vector3::new(0.0, 0.0, 0.0));
    println!(
        "{:indent$}{} [{kind}] at ({:.2}, {:.2}, {:.2})",
        "",
        node.name(),
        position.x,
        position.y,
        position.z,
        indent = depth * 2
    );
    for &child in node.children() {
        print_node(scene, child, depth + 1);
    }
}
