use crate::config::FileConfig;
use crate::error::Result;
use tracing::info;

pub fn run() -> Result<()> {
    info!("Rendering default configuration.");
    print!("{}", FileConfig::defaults().to_toml()?);
    Ok(())
}
