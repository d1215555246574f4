use clap::Parser;
use log::{error, info};
use rtlink_core::cli::{setup_logging, Cli, OutputFormat};
use rtlink_core::{ingest_paths, Batch, DisplayTree, TreeBuilder, TreeReport};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let batch = match ingest_paths(&cli.paths).await {
        Ok(batch) => batch,
        Err(e) => {
            error!("Failed to read input: {}", e);
            eprintln!("Error: Failed to read input: {}", e);
            process::exit(1);
        }
    };

    let builder = TreeBuilder::new(&batch.studies);
    let tree = if cli.flat {
        builder.flat_tree()
    } else {
        builder.build()
    };
    let tree = match tree {
        Ok(tree) => tree,
        Err(e) => {
            error!("Failed to build tree: {}", e);
            eprintln!("Error: Failed to build tree: {}", e);
            process::exit(1);
        }
    };
    info!("Tree has {} nodes, {} roots", tree.len(), tree.root().len());

    output_tree(&DisplayTree::from(&tree), &batch, cli.format);
}

fn output_tree(tree: &DisplayTree, batch: &Batch, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TreeReport::new(tree, &batch.ignored));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(tree, batch) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                let _ = (tree, batch);
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(tree: &DisplayTree, batch: &Batch) -> Result<String, serde_json::Error> {
    #[derive(serde::Serialize)]
    struct Output<'a> {
        tree: &'a DisplayTree,
        ignored: &'a [rtlink_core::IgnoredFile],
        directory_files: &'a [String],
    }

    serde_json::to_string_pretty(&Output {
        tree,
        ignored: &batch.ignored,
        directory_files: &batch.directory_files,
    })
}
