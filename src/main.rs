fn main() -> anyhow::Result<()> {
    // Dropping the guard flushes buffered log lines.
    let _guard = paramgate::logging::init_logging()?;
    paramgate::cli::run_cli()
}
