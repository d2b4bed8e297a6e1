#[macro_use]
extern crate clap;

use std::fs::File;
use std::io::prelude::*;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process;

use byteorder::WriteBytesExt;
use clap::Arg;
use ngc_asm::ErrorKind;
use util::Endian;

#[derive(Debug)]
enum CliError {
    Asm(ngc_asm::Error),
    Io(io::Error),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Asm(err) => err.kind as i32,
            CliError::Io(_) => ErrorKind::File as i32,
        }
    }
}

fn main() {
    let app = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the input file to use (\"-\" for stdin)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .default_value("-")
                .help("Sets the output file to write to (\"-\" for stdout)"),
        )
        .arg(
            Arg::with_name("source_map")
                .short("m")
                .long("source-map")
                .takes_value(true)
                .value_name("SOURCE_MAP")
                .help("Sets the file to write the source map to"),
        )
        .arg(
            Arg::with_name("version_lower")
                .short("v")
                .help("Prints version information"),
        );

    let matches = match app.get_matches_safe() {
        Ok(m) => m,
        Err(e) => match e.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(ErrorKind::Args as i32);
            }
        },
    };

    if matches.is_present("version_lower") {
        println!("{} {}", crate_name!(), crate_version!());
        process::exit(0);
    }

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output").unwrap();
    let map = matches.value_of("source_map");

    if let Err(err) = run(input, output, map) {
        eprintln!("{}", format_error(input, &err));
        process::exit(err.exit_code());
    }
}

fn run(input: &str, output: &str, map: Option<&str>) -> Result<(), CliError> {
    let source = read_input(input).map_err(CliError::Io)?;

    let (words, source_map) = ngc_asm::assemble_source(&source).map_err(CliError::Asm)?;

    write_output(output, &words).map_err(CliError::Io)?;

    if let Some(map_path) = map {
        write_source_map(map_path, &source_map).map_err(CliError::Io)?;
    }

    Ok(())
}

fn read_input(path: &str) -> io::Result<String> {
    let mut buf = String::new();
    if path == "-" {
        io::stdin().read_to_string(&mut buf)?;
    } else {
        BufReader::new(File::open(path)?).read_to_string(&mut buf)?;
    }
    Ok(buf)
}

fn write_output(path: &str, words: &[ngc_core::Word]) -> io::Result<()> {
    if path == "-" {
        ngc_fmt::write_words(&mut io::stdout().lock(), words)
    } else {
        ngc_fmt::write_words(&mut BufWriter::new(File::create(path)?), words)
    }
}

fn write_source_map(path: &str, map: &ngc_asm::SourceMap) -> io::Result<()> {
    let mut writer = BufWriter::new(File::create(PathBuf::from(path))?);
    for item in map {
        writer.write_u32::<Endian>(item.line)?;
    }
    Ok(())
}

fn format_error(input: &str, err: &CliError) -> String {
    match err {
        CliError::Asm(e) if e.kind == ErrorKind::Syntax && e.line > 0 => {
            format!("{}:{}: {}", input, e.line, e.message)
        }
        CliError::Asm(e) => format!("{}: {}", input, e.message),
        CliError::Io(e) => format!("{}: {}", input, e),
    }
}
