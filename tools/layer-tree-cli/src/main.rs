use anyhow::{Context, Result, anyhow};
use clap::Parser;
use fern::colors::{Color, ColoredLevelConfig};
use layer_tree::layers::group_layer::FlatEntry;
use layer_tree::{Document, LayerId};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "layer-tree-cli")]
#[command(about = "Replay a layer snapshot and batches of layer changes, printing the resulting layer tree")]
struct Args {
	/// JSON descriptor of the document root and all of its layers
	#[arg(short, long)]
	snapshot: PathBuf,

	/// JSON batch of change records, applied in the order given
	#[arg(short, long)]
	changes: Vec<PathBuf>,

	/// Print the flattened index of a layer once all batches are applied
	#[arg(long)]
	find: Option<String>,

	/// Print the layer at a flattened index once all batches are applied
	#[arg(long)]
	at_index: Option<usize>,

	/// Print every slot of the flattened index space
	#[arg(long)]
	flat: bool,

	/// Increase logging verbosity (-v for debug, -vv for trace)
	#[arg(short, long, action = clap::ArgAction::Count)]
	verbose: u8,
}

fn setup_logging(verbose: u8) -> Result<()> {
	let level = match verbose {
		0 => log::LevelFilter::Info,
		1 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};
	let colors = ColoredLevelConfig::new().debug(Color::Magenta).info(Color::Green).error(Color::Red);

	fern::Dispatch::new()
		.chain(std::io::stderr())
		.level(level)
		.format(move |out, message, record| {
			out.finish(format_args!(
				"[{}]{} {}",
				colors.color(record.level()),
				chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
				message
			))
		})
		.apply()
		.context("Failed to install the logger")
}

fn read(path: &Path) -> Result<String> {
	fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))
}

fn main() -> Result<()> {
	let args = Args::parse();
	setup_logging(args.verbose)?;

	let mut document = Document::from_json(&read(&args.snapshot)?).with_context(|| format!("Failed to load snapshot {:?}", args.snapshot))?;
	log::info!("Loaded {:?}, {} slots", args.snapshot, document.size() - 2);
	println!("{document}");

	for path in &args.changes {
		let changes = Document::parse_changes(&read(path)?).with_context(|| format!("Failed to parse changes {:?}", path))?;
		let responses = document.apply_changes(&changes).with_context(|| format!("Failed to apply changes {:?}", path))?;
		log::info!("Applied {:?}, {} responses", path, responses.len());

		for response in &responses {
			log::debug!("{} {}", response, response.id());
			println!("{}", serde_json::to_string(response)?);
		}
		println!("{document}");
	}

	if let Some(id) = args.find {
		let id = LayerId::new(id);
		let index = document.layer_index(&id).ok_or_else(|| anyhow!("Layer {} is not part of the document", id))?;
		println!("{id}: {index}");
	}

	if let Some(index) = args.at_index {
		match document.layer_at_index(index) {
			Some(layer) => println!("{index}: {layer}"),
			None => println!("{index}: -"),
		}
	}

	if args.flat {
		for (index, entry) in document.flatten().into_iter().enumerate() {
			match entry {
				FlatEntry::Layer(layer) => println!("{index}\t{}:{}", layer.id, layer.name.as_deref().unwrap_or("-")),
				FlatEntry::SectionEnd(group) => println!("{index}\t</{}>", group.id),
			}
		}
	}

	Ok(())
}
