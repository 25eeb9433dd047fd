//! hookline entry point
//!
//! Everything lives in the library; this only sets up error reporting.

use clap::Parser;

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(false)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))
    .ok();

    let cli = hookline::Cli::parse();

    match hookline::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let report = miette::Report::msg(format!("{e:#}"));
            eprintln!("{report:?}");
            std::process::exit(1);
        }
    }
}
