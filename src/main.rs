fn main() {
    #[cfg(feature = "cli")]
    framepress::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("framepress: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
