//! sshconfig binary entry point

fn main() -> anyhow::Result<()> {
    sshconfig::run()
}
