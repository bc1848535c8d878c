use anyhow::{Context, Result};
use std::io::{self, BufRead, Write};
use std::path::Path;

use parley_api::setup::{is_affirmative, SetupAnswers};

fn ask(stdin: &mut impl BufRead, question: &str) -> Result<String> {
    print!("{}", question);
    io::stdout().flush()?;

    let mut answer = String::new();
    stdin.read_line(&mut answer)?;
    Ok(answer.trim().to_string())
}

fn main() -> Result<()> {
    println!("Parley Setup");
    println!("============\n");
    println!("This will write the environment variables the server needs to .env\n");

    let env_path = Path::new(".env");
    let stdin = io::stdin();
    let mut input = stdin.lock();

    if env_path.exists() {
        let overwrite = ask(&mut input, ".env file already exists. Overwrite? (y/N): ")?;
        if !is_affirmative(&overwrite) {
            println!("Setup cancelled.");
            return Ok(());
        }
    }

    println!("Completion endpoint credentials:\n");
    let endpoint = ask(
        &mut input,
        "Endpoint URL (e.g. https://your-resource.openai.azure.com/...): ",
    )?;
    let api_key = ask(&mut input, "API key: ")?;
    let port = ask(&mut input, "Port (default 3000): ")?;
    let environment = ask(&mut input, "Environment (dev/production, default dev): ")?;

    let answers = match SetupAnswers::new(&endpoint, &api_key, &port, &environment) {
        Ok(answers) => answers,
        Err(e) => {
            println!("\nError: {}", e);
            return Ok(());
        }
    };

    for warning in answers.warnings() {
        println!("\nWarning: {}", warning);
    }

    std::fs::write(env_path, answers.render_env_file())
        .with_context(|| format!("Failed to write {}", env_path.display()))?;

    println!("\n✓ Configuration saved to .env");
    println!("\nNext steps:");
    println!("   1. cargo run --bin parley-api");
    println!("   2. Open http://localhost:{}", answers.port);

    Ok(())
}
