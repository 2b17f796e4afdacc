use anyhow::{Context, Result};
use booster_selector::{logging, Outcome, Settings};

fn main() -> Result<()> {
    let settings = Settings::from_env().context("Invalid configuration")?;
    logging::init(&settings).context("Failed to set up logging")?;

    match booster_selector::run(&settings) {
        Ok(Outcome::Unchanged { .. }) => Ok(()),
        Ok(Outcome::Reconfigured { ip, location, prefs }) => {
            log::info!(
                "Configured {} booster(s) for {} ({})",
                prefs.booster_count(),
                ip,
                location.as_deref().unwrap_or("no location")
            );
            Ok(())
        }
        Err(e) => {
            log::error!("Booster selection failed: {}", e);
            Err(e).context("Booster selection failed")
        }
    }
}
