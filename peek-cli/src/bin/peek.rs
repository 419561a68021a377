use std::{error::Error, process::ExitCode, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use log::{debug, LevelFilter};
use peek_cli::{interactive::{interactive, HELP}, preview::{preview, PreviewArgs}};
use peek_core::{previewable::object_url::DiskObjectUrls, PreviewDispatcher, PreviewState};
use tokio::{io::BufReader, runtime};

#[derive(Parser, Debug)]
#[command(name = "peek")]
#[command(version = "0.1")]
#[command(about = "previews a single file according to its declared media type", long_about = None)]
struct Args {
    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,
    /// Read select/upload commands from stdin instead of previewing one path
    #[arg(short, long, conflicts_with = "path")]
    interactive: bool,
    /// Declared media type of the file, guessed from its extension by default
    #[arg(short = 't', long = "type", requires = "path")]
    declared_type: Option<String>,
    /// Keep the backing file of a document preview after exiting
    #[arg(short, long)]
    keep: bool,
    /// File to preview
    path: Option<Utf8PathBuf>,
}

fn main() -> Result<ExitCode, Box<dyn Error>> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    let rt = runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    rt.block_on(run(args))
}

async fn run(args: Args) -> Result<ExitCode, Box<dyn Error>> {
    let urls = DiskObjectUrls::from_config()?;
    debug!("Document previews are written to {}", urls.directory());
    let dispatcher = PreviewDispatcher::new(Arc::new(urls));

    if args.interactive {
        println!("{}", HELP);
        interactive(&dispatcher, BufReader::new(tokio::io::stdin())).await?;
        return Ok(ExitCode::SUCCESS);
    }

    let state = preview(&dispatcher, PreviewArgs {
        path: args.path,
        declared_type: args.declared_type,
        keep: args.keep,
    }).await;

    Ok(match state {
        PreviewState::Error { .. } => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    })
}
