use clap::Parser;
use miette::Result;
use docgen::cli::{commands, logging, Cli, Commands};

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    logging::init(&global)?;

    match cli.command {
        Commands::Generate(args) => commands::generate::run(args, &global),
        Commands::List(args) => commands::list::run(args, &global),
        Commands::Match(args) => commands::match_schema::run(args),
        Commands::Completions(args) => commands::completions::run(args),
    }
}
