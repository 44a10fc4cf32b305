fn main() {
    #[cfg(feature = "cli")]
    deltapatch::cli::run();

    #[cfg(not(feature = "cli"))]
    {
        eprintln!("deltapatch: CLI not enabled. Rebuild with `--features cli`.");
        std::process::exit(1);
    }
}
