fn main() -> anyhow::Result<()> {
    hireintel_app::run_app()
}
