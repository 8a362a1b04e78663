extern crate gnu_v2_demangler;

use std::io;
use std::io::BufRead;

use clap::Parser;
use gnu_v2_demangler::{demangle_with_style, DemangleFlags, Style};

#[derive(Parser)]
#[command(author, version = env!("CARGO_PKG_VERSION"), about = "Demangle GNU v2 and cfront C++ symbols", long_about = None)]
struct Cli {
    /// Mangling style: auto, gnu, lucid, arm, hp or edg
    #[arg(short = 's', long, default_value = "gnu")]
    format: Style,

    /// Print function names without their parameter lists
    #[arg(short = 'p', long)]
    no_params: bool,

    /// Omit const, volatile and __restrict qualifiers
    #[arg(long)]
    no_ansi: bool,

    /// Print names with Java conventions
    #[arg(short, long)]
    java: bool,

    /// Remove one leading underscore before demangling
    #[arg(long)]
    strip_underscore: bool,

    /// Symbols to demangle; standard input is read when none are given
    symbols: Vec<String>,
}

impl Cli {
    fn flags(&self) -> DemangleFlags {
        let mut flags = DemangleFlags::COMPLETE;
        if self.no_params {
            flags.remove(DemangleFlags::PARAMS);
        }
        if self.no_ansi {
            flags.remove(DemangleFlags::ANSI);
        }
        if self.java {
            flags.insert(DemangleFlags::JAVA);
        }
        flags
    }
}

fn main() {
    let cli = Cli::parse();
    let flags = cli.flags();

    let print_demangled = |sym: &str| {
        let mangled = if cli.strip_underscore {
            sym.strip_prefix('_').unwrap_or(sym)
        } else {
            sym
        };
        match demangle_with_style(mangled, flags, cli.format) {
            Ok(ref string) => println!("{}", string),
            _ => println!("{}", sym),
        }
    };

    if cli.symbols.is_empty() {
        let stdin = io::stdin();
        let handle = stdin.lock();

        for line in handle.lines() {
            match line {
                Ok(line) => print_demangled(&line),
                _ => continue,
            }
        }
        return;
    }

    for sym in &cli.symbols {
        print_demangled(sym);
    }
}
