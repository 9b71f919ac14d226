use clap::Parser;
use cssnest_lib::{flatten_json, NestError, SheetOptions};
use std::fs;
use std::io::{self, Read};

#[derive(Parser)]
#[command(name = "cssnest")]
#[command(about = "Flatten nested JSON style objects into CSS")]
struct Args {
    /// Input JSON file, `-` for stdin.
    input: String,

    /// Output CSS file. Prints to stdout when omitted.
    #[arg(short, long)]
    output: Option<String>,

    /// Print minified CSS.
    #[arg(short, long)]
    minify: bool,

    /// Use rule names as selectors instead of generated class names.
    #[arg(long)]
    unscoped: bool,

    /// Prefix for generated class names.
    #[arg(long, default_value = "")]
    prefix: String,

    /// Print the rule name to class name map as JSON on stderr.
    #[arg(long)]
    classes: bool,

    /// Log hoisting decisions and dropped directives.
    #[arg(short, long)]
    verbose: bool,
}

fn read_input(input: &str) -> Result<String, NestError> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

fn run(args: &Args) -> Result<(), NestError> {
    let json = read_input(&args.input)?;
    log::info!("read {} bytes from {}", json.len(), args.input);

    let options = SheetOptions {
        scoped: !args.unscoped,
        class_prefix: args.prefix.clone(),
        ..SheetOptions::default()
    };
    let sheet = flatten_json(&json, options)?;

    for dropped in sheet.diagnostics() {
        log::info!("dropped `{}`", dropped.key());
    }

    let css = if args.minify {
        sheet.to_css_minified()?
    } else {
        sheet.to_css()
    };

    if args.classes {
        let classes: serde_json::Map<String, serde_json::Value> = sheet
            .classes()
            .iter()
            .map(|(key, class)| (key.clone(), serde_json::Value::String(class.clone())))
            .collect();
        eprintln!("{}", serde_json::Value::Object(classes));
    }

    match &args.output {
        Some(path) => {
            fs::write(path, css + "\n")?;
            log::info!("wrote {}", path);
        }
        None => println!("{}", css),
    }
    Ok(())
}

fn main() {
    // parse the args given in terminal
    let args: Args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
