//! RV32 cycle-accurate simulator CLI.
//!
//! Loads a program image (hex records or flat binary), runs the core until
//! the program exits or the cycle budget runs out, and reports statistics.

use std::process;

use clap::Parser;

use rv32sim_core::config::Config;
use rv32sim_core::sim::loader;
use rv32sim_core::Simulator;

#[derive(Parser, Debug)]
#[command(
    name = "rv32sim",
    author,
    version,
    about = "Cycle-accurate 5-stage RV32 core simulator",
    long_about = "Run a program on the simulated core.\n\nImages are $readmemh-style hex records (--hex) or flat binaries loaded at the\nmemory base. Programs terminate with the bare-metal exit convention\n(ECALL, a7=93, exit code in a0) or when --max-cycles elapse.\n\nExamples:\n  rv32sim program.bin\n  rv32sim --hex program.hex --stats\n  rv32sim program.bin --config cfg.json --trace"
)]
struct Cli {
    /// Program image to execute.
    file: String,

    /// Treat the image as hex records instead of a flat binary.
    #[arg(long)]
    hex: bool,

    /// JSON configuration file (defaults apply otherwise).
    #[arg(long)]
    config: Option<String>,

    /// Emit the per-cycle pipeline diagram to stderr.
    #[arg(long)]
    trace: bool,

    /// Stop after this many cycles even without an exit.
    #[arg(long, default_value_t = 1_000_000)]
    max_cycles: u64,

    /// Print the statistics report when the run ends.
    #[arg(long)]
    stats: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(ref path) => {
            let text = std::fs::read_to_string(path).unwrap_or_else(|e| {
                eprintln!("Error reading config {path}: {e}");
                process::exit(1);
            });
            serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {path}: {e}");
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if cli.trace {
        config.general.trace = true;
    }

    let mut sim = Simulator::new(&config);

    let loaded = if cli.hex {
        loader::load_hex_file(&mut sim.cpu.mem, &cli.file)
    } else {
        loader::load_binary_file(&mut sim.cpu.mem, &cli.file)
    };
    if let Err(e) = loaded {
        eprintln!("Error loading {}: {e}", cli.file);
        process::exit(1);
    }

    match sim.run(cli.max_cycles) {
        Ok(exit) => {
            if cli.stats {
                sim.cpu.stats.print();
            }
            match exit {
                Some(code) => {
                    println!("[*] Exit code {code}");
                    process::exit(code as i32);
                }
                None => {
                    eprintln!(
                        "[!] No exit after {} cycles (pc={:#010x})",
                        cli.max_cycles, sim.cpu.pc
                    );
                    process::exit(2);
                }
            }
        }
        Err(fault) => {
            eprintln!("\n[!] FATAL: {fault}");
            eprintln!("    pc={:#010x} cycle={}", sim.cpu.pc, sim.cpu.stats.cycles);
            if cli.stats {
                sim.cpu.stats.print();
            }
            process::exit(1);
        }
    }
}
