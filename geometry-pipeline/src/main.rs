//! Geometry ingestion entry point
use std::env;

use geometry_pipeline::{CloudIngestor, obj};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <input.las|input.obj>", args[0]);
        std::process::exit(1);
    }

    let input_path = &args[1];
    if input_path.ends_with(".las") {
        let ingestor = CloudIngestor::new(input_path)?;
        let outcome = ingestor.ingest()?;
        println!("{}", ingestor.metadata(&outcome));

        let mesh = outcome.cloud.into_mesh();
        println!("Point mesh ready: {} positions", mesh.vertex_count());
    } else {
        let mesh = obj::load_model(input_path)?;
        println!(
            "Model loaded: {} vertices, {} triangles",
            mesh.vertex_count(),
            mesh.triangle_count()
        );
    }

    Ok(())
}
