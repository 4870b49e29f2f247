use cupcake_mcp::{client::driver, config::Config, logging};

#[tokio::main]
async fn main() {
    logging::init_logging();

    let mut stdout = std::io::stdout();
    let outcome = match Config::new() {
        Ok(config) => driver::run(&config.endpoint_url(), &mut stdout).await,
        Err(err) => {
            println!("Connection failed: {err}");
            return;
        }
    };

    driver::report(outcome, &mut stdout);
}
