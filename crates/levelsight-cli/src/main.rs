mod artifacts;
mod command;

fn main() -> anyhow::Result<()> {
    command::run()
}
