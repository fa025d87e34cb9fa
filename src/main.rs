use std::error::Error;
use std::path::Path;
use vpc_topology::output::{graph_json, graph_print};
use vpc_topology::{config, synthesize};

fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    log4rs::init_file("log4rs.yml", Default::default())?;
    dotenv::dotenv().ok();
    log::info!("#Start main()");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");

    let network_config = match args.iter().find(|a| !a.starts_with("--")) {
        Some(path) => config::from_file(Path::new(path))?,
        None => config::from_env()?,
    };

    let graph = synthesize(&network_config)?;

    if as_json {
        println!("{}", graph_json(&graph)?);
    } else {
        graph_print(&graph);
    }

    Ok(())
}
