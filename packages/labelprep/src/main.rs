use std::sync::Arc;

use clap::Parser;
use labelprep::cli::{Args, Commands};
use labelprep::distiller::{Distiller, DistillerOptions};
use labelprep::init_tracing;
use labelprep::server::{run_server, ServerConfig};
use labelprep::task_generator::{GeneratorOptions, TaskGenerator};
use labelprep_ocr::RemoteOcrEngine;
use tracing::info;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    match args.command {
        Commands::Version => {
            println!("labelprep {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        Commands::Generate {
            images,
            output,
            ocr_url,
            host,
            port,
            no_boxes,
            no_transcripts,
            no_labels,
            limit,
            quiet,
        } => {
            init_tracing(quiet);

            let options = GeneratorOptions {
                image_dir: images,
                output_path: output,
                host,
                port,
                include_boxes: !no_boxes,
                include_transcripts: !no_transcripts,
                include_labels: !no_labels,
                limit,
                ..GeneratorOptions::default()
            };
            let engine = Arc::new(RemoteOcrEngine::new(&ocr_url));
            let generator = TaskGenerator::new(options, engine);

            let result = generator.generate().await?;
            info!(
                images = result.images_processed,
                skipped = result.files_skipped,
                regions = result.regions,
                "generation finished"
            );
            Ok(())
        }
        Commands::Distill {
            input,
            output,
            labels,
            image_root,
            quiet,
        } => {
            init_tracing(quiet);

            let distiller = Distiller::new(DistillerOptions {
                input_path: input,
                output_path: output,
                labels_path: labels,
                image_root,
            });

            let result = distiller.distill().await?;
            info!(
                records = result.records,
                regions = result.regions,
                "distillation finished"
            );
            Ok(())
        }
        Commands::Serve { dir, port, quiet } => {
            init_tracing(quiet);
            run_server(ServerConfig { dir, port }).await
        }
    }
}
