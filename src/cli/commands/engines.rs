use anyhow::Result;
use colored::*;

use crate::report::{find_executable, CONVERTER, PDF_ENGINES};

pub fn run() -> Result<()> {
    print_probe(CONVERTER);
    println!();
    println!("{}", "PDF engines (probed in order):".bold());
    for engine in PDF_ENGINES {
        print_probe(engine);
    }
    Ok(())
}

fn print_probe(name: &str) {
    match find_executable(name) {
        Some(path) => println!(
            "  {} {} {}",
            "✓".green().bold(),
            name,
            format!("({})", path.display()).dimmed()
        ),
        None => println!("  {} {} {}", "✗".red(), name, "not found".dimmed()),
    }
}
