use anyhow::Result;

fn main() -> Result<()> {
    convert_desk::cli::run()
}
