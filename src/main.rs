use std::sync::Arc;

use storyloom::{
    BlobStore, FileStore, OpenAiGateway, Settings, Studio, logging, settings::SETTINGS_FILE,
    shell::Shell,
};

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let data_dir = Settings::data_dir();
    let settings = Settings::load(&data_dir);
    if !data_dir.join(SETTINGS_FILE).exists() {
        // Write the defaults out once so there is a file to edit.
        settings.save(&data_dir)?;
    }
    logging::init(data_dir.clone(), settings.debug_mode)?;
    log::info!("Storyloom start: {}", chrono::Local::now());

    let store: Arc<dyn BlobStore> = Arc::new(FileStore::new(&data_dir));
    let studio = Arc::new(Studio::open(OpenAiGateway::new(&settings), store));

    // Run the shell until the user quits or stdin closes.
    let mut shell = Shell::new(studio);
    if let Err(err) = shell.run().await {
        log::error!("Shell stopped: {err}");
        return Err(err.into());
    }

    log::info!("Storyloom exit: {}", chrono::Local::now());
    Ok(())
}
