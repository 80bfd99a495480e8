//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - quantum subset-sum search",
        style("qsum").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qsum-ir           Circuit intermediate representation");
    println!("  qsum-hal          Execution backend abstraction");
    println!("  qsum-adapter-sim  Statevector simulator");
    println!("  qsum-core         Oracles, Grover search and quantum counting");
    println!("  qsum-cli          Command-line interface");
    println!();
    println!("License: {}", style(env!("CARGO_PKG_LICENSE")).dim());
}
