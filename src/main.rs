use anyhow::Context;

fn main() -> anyhow::Result<()> {
    slam_launcher::run().context("SLAM launcher failed")
}
