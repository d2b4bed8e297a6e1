#[macro_use]
extern crate clap;

use std::io::{self, Write};
use std::process;
use std::time::{Duration, Instant};

use clap::Arg;
use crossterm::cursor;
use crossterm::event::{self, Event, KeyCode};
use crossterm::execute;
use crossterm::terminal::{self, ClearType};

use ngc_core::{ngc_reset, ngc_tick, Memory};

const MIN_HZ: u32 = 1;
const MAX_HZ: u32 = 10_000;
const DEFAULT_HZ: u32 = 10;

#[derive(Debug)]
enum Error {
    Io(io::Error),
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

/// Enables terminal raw mode for the lifetime of this guard and restores
/// the previous mode on drop, so any early return (I/O error or `q`)
/// still leaves the terminal usable.
struct RawModeGuard;

impl RawModeGuard {
    fn new() -> io::Result<RawModeGuard> {
        terminal::enable_raw_mode()?;
        Ok(RawModeGuard)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), cursor::Show);
    }
}

const ARGS_EXIT_CODE: i32 = 2;

fn main() {
    let app = app_from_crate!()
        .arg(
            Arg::with_name("ROM")
                .help("Sets the ROM file to load (\"-\" for stdin)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("hz")
                .short("z")
                .long("hz")
                .takes_value(true)
                .value_name("HZ")
                .default_value("10")
                .help("Sets the initial clock frequency in Hz"),
        );

    let matches = match app.get_matches_safe() {
        Ok(m) => m,
        Err(e) => match e.kind {
            clap::ErrorKind::HelpDisplayed | clap::ErrorKind::VersionDisplayed => e.exit(),
            _ => {
                eprintln!("{}", e.message);
                process::exit(ARGS_EXIT_CODE);
            }
        },
    };

    let rom_path = matches.value_of("ROM").unwrap();
    let hz = value_t!(matches, "hz", u32).unwrap_or(DEFAULT_HZ);

    if let Err(err) = run(rom_path, hz) {
        eprintln!("{}: {}", rom_path, err);
        process::exit(1);
    }
}

fn run(rom_path: &str, hz: u32) -> Result<(), Error> {
    let words = if rom_path == "-" {
        ngc_fmt::read_words(&mut io::stdin().lock())?
    } else {
        ngc_fmt::read_rom_file(rom_path)?
    };

    let mut mem = Memory::new();
    mem.load_rom(&words);

    let _raw_mode = RawModeGuard::new()?;
    execute!(io::stdout(), terminal::Clear(ClearType::All), cursor::Hide)?;

    let result = event_loop(&mut mem, hz.max(MIN_HZ).min(MAX_HZ));

    println!();
    result
}

/// Interactive keys: `q`/Esc quit, `r` reset volatile memory, `p` pause/
/// resume, `s` single-step when paused, `[`/`]` divide/multiply clock
/// frequency by 10 within `[MIN_HZ, MAX_HZ]`.
fn event_loop(mem: &mut Memory, initial_hz: u32) -> Result<(), Error> {
    let mut hz = initial_hz;
    let mut paused = false;
    let mut last_tick = Instant::now();

    draw_status(mem, hz, paused)?;

    loop {
        let period = Duration::from_micros(1_000_000 / u64::from(hz));
        let elapsed = last_tick.elapsed();
        let timeout = if elapsed >= period {
            Duration::from_millis(0)
        } else {
            period - elapsed
        };

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('r') => {
                        ngc_reset(mem);
                        draw_status(mem, hz, paused)?;
                    }
                    KeyCode::Char('p') => {
                        paused = !paused;
                        draw_status(mem, hz, paused)?;
                    }
                    KeyCode::Char('s') if paused => {
                        tick_once(mem);
                        draw_status(mem, hz, paused)?;
                    }
                    KeyCode::Char('[') => {
                        hz = (hz / 10).max(MIN_HZ);
                        draw_status(mem, hz, paused)?;
                    }
                    KeyCode::Char(']') => {
                        hz = (hz.saturating_mul(10)).min(MAX_HZ);
                        draw_status(mem, hz, paused)?;
                    }
                    _ => {}
                }
            }
        }

        if !paused && last_tick.elapsed() >= period {
            last_tick = Instant::now();
            if mem.pc < mem.rom_len {
                tick_once(mem);
                draw_status(mem, hz, paused)?;
            }
        }
    }
}

fn tick_once(mem: &mut Memory) {
    if mem.pc < mem.rom_len {
        ngc_tick(mem);
    }
}

fn draw_status(mem: &Memory, hz: u32, paused: bool) -> io::Result<()> {
    let halted = mem.pc >= mem.rom_len;
    let inst = if halted { 0 } else { mem.rom[mem.pc as usize] };

    let state = if halted {
        "halted"
    } else if paused {
        "paused"
    } else {
        "running"
    };

    let mut stdout = io::stdout();
    execute!(
        stdout,
        cursor::MoveTo(0, 0),
        terminal::Clear(ClearType::CurrentLine),
    )?;
    write!(
        stdout,
        "A={:#06x} D={:#06x} PC={:#06x} INST={:#06x} HZ={:<5} [{}]",
        mem.a as u16, mem.d as u16, mem.pc, inst as u16, hz, state
    )?;
    execute!(
        stdout,
        cursor::MoveTo(0, 1),
        terminal::Clear(ClearType::CurrentLine),
    )?;
    write!(stdout, "q/Esc quit  r reset  p pause  s step  [ ] speed")?;
    stdout.flush()
}
