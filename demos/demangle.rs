use std::env;
extern crate gnu_v2_demangler;
use gnu_v2_demangler::*;
fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        println!("{} <symbol> [auto|gnu|lucid|arm|hp|edg]", args[0]);
        std::process::exit(1);
    }

    let style = match args.get(2).map(|s| s.parse::<Style>()) {
        Some(Ok(style)) => style,
        Some(Err(err)) => {
            eprintln!("error: {}", err);
            std::process::exit(1);
        }
        None => Style::default(),
    };

    match demangle_with_style(&args[1], DemangleFlags::COMPLETE, style) {
        Ok(s) => {
            println!("{}", s);
        }
        Err(err) => {
            eprintln!("error: {:?}", err);
            std::process::exit(1);
        }
    }
}
