use std::io::Write;
use std::{
    error::Error,
    fs,
    process::{Command, Stdio},
};

use clap::{App, Arg, ArgMatches};
use tracing_subscriber::EnvFilter;

use astviz::frontend::normalize::normalize;
use astviz::visualize::Visualizer;

fn main() {
    let matches = App::new("astviz")
        .version("1.0.0")
        .about("Renders the abstract syntax tree of a Python program as a Graphviz/DOT graph.")
        .arg(Arg::new("file")
            .value_name("FILE")
            .about("Path to the Python file that will be visualized.")
            .required(true))
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .value_name("PATH")
            .about("Write the DOT description to the given file instead of stdout.")
            .takes_value(true))
        .arg(Arg::new("pdf")
            .long("pdf")
            .value_name("PATH")
            .about("Additionally render the graph to a PDF with the help of the \
            Graphviz 'dot' binary, which must be installed.")
            .takes_value(true))
        .arg(Arg::new("verbose")
            .short('v')
            .about("Output the normalized tree. Useful for debugging.")
            .takes_value(false))
        .get_matches();

    init_tracing();

    if let Err(e) = run(&matches) {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

/// Route log output to stderr so the DOT text on stdout stays clean.
/// `ASTVIZ_LOG` selects the filter, e.g. `ASTVIZ_LOG=astviz=debug`.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("ASTVIZ_LOG").unwrap_or_else(|_| EnvFilter::new("astviz=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: &ArgMatches) -> Result<(), Box<dyn Error>> {
    let path = args.value_of("file").unwrap();
    let src = fs::read_to_string(path)?;
    if src.trim().is_empty() {
        return Err(format!("the input file '{}' is empty", path).into());
    }

    let record = normalize(&src)?;
    if args.is_present("verbose") {
        println!("{:#?}", record);
    }

    let mut viz = Visualizer::new("ast");
    let dot = viz.layout(&record).to_string();

    match args.value_of("output") {
        Some(out) => fs::write(out, &dot)?,
        None => println!("{}", dot),
    }
    if let Some(pdf) = args.value_of("pdf") {
        write_pdf(&dot, pdf)?;
    }
    Ok(())
}

/// Pipe the DOT text through the external renderer.
fn write_pdf(dot_src: &str, outfile: &str) -> Result<(), Box<dyn Error>> {
    let mut dot = Command::new("dot")
        .arg("-Tpdf")
        .arg("-o")
        .arg(outfile)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|e| format!("unable to start 'dot', is Graphviz installed? ({})", e))?;

    dot.stdin
        .take()
        .ok_or("failed to open stdin of 'dot'")?
        .write_all(dot_src.as_bytes())?;
    let status = dot.wait()?;
    if !status.success() {
        return Err(format!("'dot' exited with {}", status).into());
    }
    Ok(())
}
