use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use clap_mangen::Man;
use dockprefs::cli::build_cli;
use std::fs::{self, File};
use std::path::PathBuf;

#[derive(Parser)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the dockprefs manpages
    Manpage {
        /// Output directory for the manpages
        #[arg(short, long, default_value = "man/man1")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Manpage { dir } => generate_manpages(dir)?,
    }

    Ok(())
}

fn generate_manpages(dir: PathBuf) -> Result<()> {
    fs::create_dir_all(&dir).context("Failed to create output directory")?;

    let cmd = build_cli();
    render(&dir.join("dockprefs.1"), Man::new(cmd.clone()))?;

    // one page per subcommand, named the way man(1) looks them up
    for sub in cmd.get_subcommands() {
        let name = format!("dockprefs-{}", sub.get_name());
        let page = Man::new(sub.clone()).title(name.to_uppercase());
        render(&dir.join(format!("{name}.1")), page)?;
    }

    Ok(())
}

fn render(path: &std::path::Path, man: Man) -> Result<()> {
    let mut file = File::create(path).context("Failed to create manpage file")?;
    man.render(&mut file)
        .context("Failed to render manpage")?;
    println!("Manpage generated at: {}", path.display());
    Ok(())
}
