use tokio::io::BufReader;
use bookshelf::books::factory::create_library;
use bookshelf::console::menu;
use bookshelf::core::domain::Configuration;
use bookshelf::utils::trace::setup_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    setup_tracing();

    let config = Configuration::from_env();
    let mut library = create_library(&config).await?;
    menu::run(library.as_mut(), BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    Ok(())
}
