use std::path::PathBuf;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(first) = args.next() else {
        eprintln!(
            "No ROM path provided.\n\
             Usage: gbmem <rom> [trace-output]\n\
             \x20      gbmem --summary <trace>\n\
             For example: gbmem path/to/your.gb trace.bin"
        );
        std::process::exit(1);
    };

    if first == "--summary" {
        let Some(trace_path) = args.next().map(PathBuf::from) else {
            eprintln!("Usage: gbmem --summary <trace>");
            std::process::exit(1);
        };
        print!("{}", gbmem::summarize(&trace_path)?);
        return Ok(());
    }

    let rom_path = PathBuf::from(first);
    let trace_path = args.next().map(PathBuf::from);

    let report = gbmem::run(&rom_path, trace_path.as_deref())?;
    print!("{report}");
    Ok(())
}
