use log::{debug, error};
use std::env;

use recipe_lens::{lens_from_config, load_config, render_suggestions, MatchMode};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = load_config()?;
    let mut mode = config.match_mode;
    let mut labels = Vec::new();

    // Ingredient labels from command-line arguments; --all/--any/--complete pick the mode
    for arg in env::args().skip(1) {
        match arg.strip_prefix("--") {
            Some(flag) => mode = flag.parse::<MatchMode>()?,
            None => labels.push(arg),
        }
    }

    if labels.is_empty() {
        error!("No ingredient labels given.");
        return Err("Usage: recipe-lens [--all|--any|--complete] LABEL...".into());
    }

    let lens = lens_from_config(&config).await?;
    debug!("Matching {:?} in '{}' mode", labels, mode);

    let suggestions = lens.matcher().find_matches(&labels, mode);
    println!("{}", render_suggestions(&suggestions));

    Ok(())
}
