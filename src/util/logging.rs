use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "APKGRAPH_LOG";

/// Filter directive derived from `-v`/`-q` flags.
pub fn default_directive(verbose: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Installs the stderr subscriber; `APKGRAPH_LOG` overrides the flags.
pub fn init_logging(verbose: u8, quiet: bool, color: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(color)
        .with_target(false)
        .compact()
        .try_init();
}
