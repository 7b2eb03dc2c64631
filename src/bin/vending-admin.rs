use anyhow::Result;
use vending_admin::cli::{actions, start};

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = start()?;

    // Handle the action
    actions::session::handle(action).await
}
