fn main() -> anyhow::Result<()> {
    scriptheal::run_cli()
}
