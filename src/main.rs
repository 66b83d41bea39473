use clap::{Parser, Subcommand};
use marky::config::RcLoader;
use marky::controller::{DocumentController, SystemClock};
use marky::storage::FileStore;
use marky::view::render_history;
use std::fs;
use std::io::IsTerminal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "marky", version, about = "Markdown document with undo, version history and search")]
struct Cli {
    /// Directory holding the autosaved document and its history
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Document(DocumentCommand),
    /// Print a sample .markyrc
    SampleConfig,
}

/// Commands that operate on the stored document
#[derive(Subcommand)]
enum DocumentCommand {
    /// Load a file into the document
    Open { file: PathBuf },
    /// Print the current document
    Show,
    /// List saved versions
    History,
    /// Restore a saved version by index
    Restore { index: usize },
    /// List matches of a regular expression
    Search {
        pattern: String,
        #[arg(short, long)]
        case_sensitive: bool,
    },
    /// Replace the nth match, or every match with --all
    Replace {
        pattern: String,
        replacement: String,
        #[arg(long)]
        all: bool,
        #[arg(long, default_value_t = 1)]
        nth: usize,
        #[arg(short, long)]
        case_sensitive: bool,
    },
    /// Byte, word and character counts
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let command = match cli.command {
        Command::SampleConfig => {
            print!("{}", RcLoader::generate_sample_rc());
            return Ok(());
        }
        Command::Document(command) => command,
    };

    let mut config = RcLoader::load_config();
    if let Some(dir) = cli.data_dir {
        config.data_dir = Some(dir);
    }

    let store = FileStore::open(config.resolve_data_dir())?;
    let mut doc = DocumentController::new(Box::new(store), Box::new(SystemClock), &config);

    let result = run(&mut doc, command);
    doc.end_session();
    result
}

fn run(doc: &mut DocumentController, command: DocumentCommand) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        DocumentCommand::Open { file } => {
            let content = fs::read_to_string(&file)?;
            doc.set_content(content);
            doc.snapshot_now();
            println!("\"{}\" loaded, {}B", file.display(), doc.buffer().len());
        }
        DocumentCommand::Show => {
            print!("{}", doc.buffer());
        }
        DocumentCommand::History => {
            let color = std::io::stdout().is_terminal();
            print!("{}", render_history(&doc.history_entries(), color));
        }
        DocumentCommand::Restore { index } => {
            if !doc.restore_version(index) {
                return Err(format!("Version {index} does not exist").into());
            }
            doc.snapshot_now();
            println!("Restored version {index}");
        }
        DocumentCommand::Search {
            pattern,
            case_sensitive,
        } => {
            doc.set_case_sensitive(case_sensitive)?;
            doc.set_search_pattern(&pattern)?;
            for found in doc.search().matches() {
                let pos = doc.position_of(found.start);
                println!("{}:{}: {}", pos.line, pos.column, found.text);
            }
            println!("{}", doc.search_status());
        }
        DocumentCommand::Replace {
            pattern,
            replacement,
            all,
            nth,
            case_sensitive,
        } => {
            doc.set_case_sensitive(case_sensitive)?;
            let count = doc.set_search_pattern(&pattern)?;

            let replaced = if all {
                doc.replace_all(&replacement)
            } else {
                if nth == 0 || nth > count {
                    return Err(format!("Match {nth} does not exist ({count} matches)").into());
                }
                for _ in 1..nth {
                    doc.next_match();
                }
                usize::from(doc.replace_current(&replacement)?)
            };

            doc.snapshot_now();
            println!("{replaced} replacement(s)");
        }
        DocumentCommand::Stats => {
            let stats = doc.stats();
            println!(
                "[{} bytes] [{} words] [{} characters]",
                stats.bytes, stats.words, stats.characters
            );
        }
    }
    Ok(())
}
